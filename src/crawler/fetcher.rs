//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the walker, including:
//! - Building HTTP clients with proper user agent strings
//! - Throttling to at most one request per configured interval
//! - Classifying failures as transport or parse errors
//!
//! Each sitemap gets exactly one attempt; there is no retry.

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::crawler::parser::{parse_sitemap_bytes, SitemapDocument};
use reqwest::Client;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Coarse classification of a fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Network failure, timeout, or non-2xx status
    Transport,

    /// The body was not a well-formed sitemap
    Parse,
}

/// Errors returned by a [`Fetch`] implementation
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("error parsing XML from {url}: {source}")]
    Parse { url: String, source: roxmltree::Error },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Transport { .. } | Self::Status { .. } | Self::Body { .. } => {
                FetchErrorKind::Transport
            }
            Self::Parse { .. } => FetchErrorKind::Parse,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Body { url, .. }
            | Self::Parse { url, .. } => url,
        }
    }
}

/// Source of parsed sitemap documents
///
/// The engine only talks to this trait, so tests can drive it with in-memory
/// documents instead of an HTTP server.
pub trait Fetch {
    fn fetch(&mut self, url: &str)
        -> impl Future<Output = Result<SitemapDocument, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sitemap_walker::config::{FetcherConfig, UserAgentConfig};
/// use sitemap_walker::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    fetcher: &FetcherConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(fetcher.timeout_secs);

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Polite HTTP fetcher
pub struct HttpFetcher {
    client: Client,
    request_interval: Duration,
    last_request: Option<Instant>,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration
    pub fn new(fetcher: &FetcherConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(fetcher, user_agent)?;
        Ok(Self::with_client(
            client,
            Duration::from_millis(fetcher.request_interval_ms),
        ))
    }

    pub fn with_client(client: Client, request_interval: Duration) -> Self {
        Self {
            client,
            request_interval,
            last_request: None,
        }
    }

    /// Sleeps as needed so consecutive requests are at least
    /// `request_interval` apart
    async fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.request_interval {
                let wait = self.request_interval - elapsed;
                tracing::trace!("Throttling for {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&mut self, url: &str) -> Result<SitemapDocument, FetchError> {
        self.throttle().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        parse_sitemap_bytes(&body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}
