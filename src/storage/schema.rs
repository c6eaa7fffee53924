//! Checkpoint file schema
//!
//! The field names below are the on-disk contract:
//!
//! ```json
//! {
//!   "sitemap_queue": ["..."],
//!   "processed_sitemaps": ["..."],
//!   "found_urls": ["..."]
//! }
//! ```

use crate::state::TraversalState;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Ordered worklist
pub const SITEMAP_QUEUE: &str = "sitemap_queue";

/// Processed sitemaps (a set stored as a list)
pub const PROCESSED_SITEMAPS: &str = "processed_sitemaps";

/// Found page URLs (a set stored as a list)
pub const FOUND_URLS: &str = "found_urls";

/// Structural problems with a decoded checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("state data is not a JSON object")]
    NotAnObject,

    #[error("missing required key in state: {0}")]
    MissingKey(&'static str),

    #[error("invalid type for key '{key}': expected {expected}, got {found}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Serialized form of a [`TraversalState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointRecord {
    pub sitemap_queue: Vec<String>,
    pub processed_sitemaps: Vec<String>,
    pub found_urls: Vec<String>,
}

impl CheckpointRecord {
    /// Snapshots a traversal state; the two sets are written sorted
    pub fn from_state(state: &TraversalState) -> Self {
        Self {
            sitemap_queue: state.worklist().map(str::to_string).collect(),
            processed_sitemaps: state
                .sorted_processed()
                .into_iter()
                .map(str::to_string)
                .collect(),
            found_urls: state
                .sorted_found()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Validates a decoded JSON value against the checkpoint schema
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let Value::Object(mut map) = value else {
            return Err(SchemaError::NotAnObject);
        };

        Ok(Self {
            sitemap_queue: take_string_list(&mut map, SITEMAP_QUEUE)?,
            processed_sitemaps: take_string_list(&mut map, PROCESSED_SITEMAPS)?,
            found_urls: take_string_list(&mut map, FOUND_URLS)?,
        })
    }

    pub fn into_state(self) -> TraversalState {
        TraversalState::from_parts(
            self.sitemap_queue,
            self.processed_sitemaps,
            self.found_urls,
        )
    }
}

fn take_string_list(
    map: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Vec<String>, SchemaError> {
    let value = map.remove(key).ok_or(SchemaError::MissingKey(key))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(SchemaError::WrongType {
                key,
                expected: "list",
                found: json_type_name(&other),
            })
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(SchemaError::WrongType {
                key,
                expected: "list of strings",
                found: json_type_name(&other),
            }),
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
