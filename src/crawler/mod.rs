//! Crawler module for sitemap fetching and traversal
//!
//! This module contains the core walking logic, including:
//! - Polite HTTP fetching
//! - Sitemap XML parsing and classification
//! - Stop signal forwarding
//! - Overall traversal coordination

mod engine;
mod fetcher;
mod parser;
mod shutdown;

pub use engine::{Engine, EngineOptions};
pub use fetcher::{build_http_client, Fetch, FetchError, FetchErrorKind, HttpFetcher};
pub use parser::{
    parse_sitemap, parse_sitemap_bytes, DocumentKind, SitemapDocument, SITEMAP_NAMESPACE,
};
pub use shutdown::{listen_for_signals, StopSignal};

use crate::config::Config;
use crate::output::RunStatistics;
use crate::storage::CheckpointStore;
use crate::SitemapError;

/// Runs a complete sitemap walk over HTTP
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP fetcher from configuration
/// 2. Install the stop signal handlers
/// 3. Load the checkpoint or seed the worklist
/// 4. Walk the sitemaps until exhausted, limited, or stopped
/// 5. Save the checkpoint and write the output
///
/// # Arguments
///
/// * `config` - Fetcher and user agent configuration
/// * `options` - Root URL, output path, limit, and resume settings
/// * `store` - Checkpoint location
///
/// # Returns
///
/// * `Ok(RunStatistics)` - The run stopped; see `reason` for why
/// * `Err(SitemapError)` - The client or signal handlers could not be set up
pub async fn crawl(
    config: &Config,
    options: EngineOptions,
    store: CheckpointStore,
) -> Result<RunStatistics, SitemapError> {
    let fetcher = HttpFetcher::new(&config.fetcher, &config.user_agent)?;
    let stop_rx = listen_for_signals()?;

    let mut engine = Engine::new(options, fetcher, store).with_stop_signals(stop_rx);
    engine.run().await
}
