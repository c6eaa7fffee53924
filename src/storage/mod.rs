//! Storage module for persisting traversal progress
//!
//! This module handles the checkpoint file that lets an interrupted run be
//! resumed, including:
//! - Serializing the traversal state under stable field names
//! - Validating the file's schema on load
//! - Classifying load failures so callers can fall back to a fresh state

mod checkpoint;
mod schema;

pub use checkpoint::CheckpointStore;
pub use schema::{CheckpointRecord, SchemaError, FOUND_URLS, PROCESSED_SITEMAPS, SITEMAP_QUEUE};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("State file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to decode state file: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to encode state: {0}")]
    Encode(serde_json::Error),

    #[error("Invalid state data format: {0}")]
    Schema(#[from] SchemaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;
