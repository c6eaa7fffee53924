//! Sitemap-Walker main entry point
//!
//! This is the command-line interface for the Sitemap-Walker URL harvester.

use anyhow::Context;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use sitemap_walker::config::{resolve_config, validate_config, Config};
use sitemap_walker::crawler::{crawl, EngineOptions};
use sitemap_walker::output::print_statistics;
use sitemap_walker::state::StopReason;
use sitemap_walker::storage::CheckpointStore;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Sitemap-Walker: a resumable sitemap URL harvester
///
/// Sitemap-Walker follows a sitemap (or sitemap index) breadth-first, writes
/// every page URL it finds to OUTPUT_FILE, and keeps a JSON state file so an
/// interrupted run can be picked up again with --resume.
#[derive(Parser, Debug)]
#[command(name = "sitemap-walker")]
#[command(version)]
#[command(about = "A resumable sitemap URL harvester", long_about = None)]
struct Cli {
    /// Root sitemap or sitemap index URL
    #[arg(value_name = "SITEMAP_URL")]
    sitemap_url: String,

    /// File the found URLs are written to, one per line
    #[arg(value_name = "OUTPUT_FILE")]
    output_file: PathBuf,

    /// Stop after collecting this many distinct URLs
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    limit: Option<i64>,

    /// Continue from the state file instead of starting over
    #[arg(long)]
    resume: bool,

    /// State file location (default: <OUTPUT_FILE>.state.json)
    #[arg(long, value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Minimum time between two requests in milliseconds
    #[arg(long, value_name = "MS")]
    request_interval_ms: Option<u64>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Delete the state file once every sitemap has been processed
    #[arg(long)]
    remove_state_on_completion: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let limit = match parse_limit(cli.limit) {
        Ok(limit) => limit,
        Err(message) => {
            tracing::error!("Error: {}", message);
            return ExitCode::FAILURE;
        }
    };

    match run(cli, limit).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("An error occurred during processing: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Warnings and errors go to stderr, everything else to stdout.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_walker=info,warn"),
            1 => EnvFilter::new("sitemap_walker=debug,info"),
            2 => EnvFilter::new("sitemap_walker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .or_else(std::io::stdout);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Checks the `--limit` value; zero and negative numbers are rejected
fn parse_limit(limit: Option<i64>) -> Result<Option<NonZeroUsize>, &'static str> {
    const INVALID: &str = "--limit must be a positive integer.";

    match limit {
        None => Ok(None),
        Some(n) if n <= 0 => Err(INVALID),
        Some(n) => usize::try_from(n)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Some)
            .ok_or(INVALID),
    }
}

/// Loads the file and environment configuration, then applies CLI overrides
fn effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config =
        resolve_config(cli.config.as_deref()).context("Failed to load configuration")?;

    apply_cli_overrides(cli, &mut config);
    validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}

fn apply_cli_overrides(cli: &Cli, config: &mut Config) {
    if let Some(timeout) = cli.timeout {
        config.fetcher.timeout_secs = timeout;
    }
    if let Some(interval) = cli.request_interval_ms {
        config.fetcher.request_interval_ms = interval;
    }
}

/// Handles the main walk operation
async fn run(cli: Cli, limit: Option<NonZeroUsize>) -> anyhow::Result<()> {
    let config = effective_config(&cli)?;

    let store = match &cli.state_file {
        Some(path) => CheckpointStore::new(path),
        None => CheckpointStore::for_output(&cli.output_file),
    };

    tracing::info!("Starting sitemap URL fetch from: {}", cli.sitemap_url);
    tracing::info!("Output file: {}", cli.output_file.display());
    tracing::info!("State file: {}", store.path().display());
    if let Some(limit) = limit {
        tracing::info!("URL limit: {}", limit);
    }
    tracing::debug!(
        "Timeout: {}s, request interval: {}ms",
        config.fetcher.timeout_secs,
        config.fetcher.request_interval_ms
    );

    let options = EngineOptions {
        root_url: cli.sitemap_url,
        output_path: cli.output_file,
        limit,
        resume: cli.resume,
        checkpoint_every: config.checkpoint.every,
        remove_checkpoint_on_completion: cli.remove_state_on_completion
            || config.checkpoint.remove_on_completion,
    };

    let stats = crawl(&config, options, store).await?;

    if stats.reason.is_finalized() {
        print_statistics(&stats);
    } else if stats.reason == StopReason::Aborted {
        tracing::info!("Run aborted. Exiting.");
        // Leave without waiting on an unfinished final write
        std::process::exit(0);
    } else {
        tracing::info!("Run interrupted. Exiting.");
    }

    Ok(())
}
