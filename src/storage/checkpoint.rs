//! JSON checkpoint store
//!
//! Saves are a plain overwrite of the target file; a crash mid-write can
//! leave a truncated checkpoint, which the next resume reports as a decode
//! error and treats as "no checkpoint".

use crate::state::TraversalState;
use crate::storage::schema::CheckpointRecord;
use crate::storage::{CheckpointError, CheckpointResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Loads and saves [`TraversalState`] snapshots at a fixed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default location for an output file,
    /// `<output>.state.json`
    ///
    /// # Example
    ///
    /// ```
    /// use sitemap_walker::storage::CheckpointStore;
    /// use std::path::Path;
    ///
    /// let store = CheckpointStore::for_output(Path::new("urls.txt"));
    /// assert_eq!(store.path(), Path::new("urls.txt.state.json"));
    /// ```
    pub fn for_output(output: &Path) -> Self {
        let mut path = output.as_os_str().to_owned();
        path.push(".state.json");
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(TraversalState)` - A state satisfying the worklist invariants
    /// * `Err(CheckpointError::NotFound)` - The file does not exist
    /// * `Err(CheckpointError::Decode)` - The file is not well-formed JSON
    /// * `Err(CheckpointError::Schema)` - A key is missing or has the wrong shape
    /// * `Err(CheckpointError::Io)` - The file could not be read
    pub fn load(&self) -> CheckpointResult<TraversalState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CheckpointError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let value: serde_json::Value = serde_json::from_str(&content)?;
        let record = CheckpointRecord::from_value(value)?;

        Ok(record.into_state())
    }

    /// Writes the state, replacing any previous checkpoint
    pub fn save(&self, state: &TraversalState) -> CheckpointResult<()> {
        let record = CheckpointRecord::from_state(state);
        let json = serde_json::to_string_pretty(&record).map_err(CheckpointError::Encode)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Deletes the checkpoint file
    ///
    /// Returns `Ok(false)` if there was nothing to delete.
    pub fn remove(&self) -> CheckpointResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
