//! State tracking module
//!
//! This module contains the traversal state that is checkpointed between runs
//! and the lifecycle states of the traversal engine.

mod engine_status;
mod traversal;

pub use engine_status::{EngineStatus, StopReason};
pub use traversal::TraversalState;
