//! Configuration module for Sitemap-Walker
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file and its environment overrides.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_walker::config::resolve_config;
//! use std::path::Path;
//!
//! let config = resolve_config(Some(Path::new("walker.toml"))).unwrap();
//! println!("Request interval: {}ms", config.fetcher.request_interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CheckpointConfig, Config, FetcherConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, load_config, resolve_config, EMAIL_VAR, REQUEST_INTERVAL_VAR,
};
pub use validation::validate as validate_config;
