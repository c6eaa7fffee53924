//! Run statistics
//!
//! This module summarizes a finished (or stopped) run for the operator.

use crate::state::{StopReason, TraversalState};
use std::time::Duration;

/// Run statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatistics {
    /// Why the run stopped
    pub reason: StopReason,

    /// Sitemaps fetched and classified (across all resumed runs)
    pub sitemaps_processed: usize,

    /// Sitemaps dropped in this run because the fetch or parse failed
    pub sitemaps_failed: usize,

    /// Sitemaps still waiting in the worklist
    pub sitemaps_pending: usize,

    /// Distinct page URLs found
    pub urls_found: usize,

    /// Wall-clock time spent in this run
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Builds statistics from the final traversal state
    pub fn from_state(
        reason: StopReason,
        state: &TraversalState,
        sitemaps_failed: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            reason,
            sitemaps_processed: state.processed_count(),
            sitemaps_failed,
            sitemaps_pending: state.pending_count(),
            urls_found: state.found_count(),
            elapsed,
        }
    }

    /// Returns true if nothing is left to do on a resume
    pub fn is_complete(&self) -> bool {
        self.sitemaps_pending == 0 && self.reason == StopReason::Exhausted
    }
}

/// Logs statistics in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &RunStatistics) {
    tracing::info!("=== Run Statistics ===");
    tracing::info!("  Stopped: {}", stats.reason);
    tracing::info!("  Sitemaps processed: {}", stats.sitemaps_processed);
    tracing::info!("  Sitemaps failed: {}", stats.sitemaps_failed);
    tracing::info!("  Sitemaps pending: {}", stats.sitemaps_pending);
    tracing::info!("  URLs found: {}", stats.urls_found);
    tracing::info!("  Elapsed: {:.2}s", stats.elapsed.as_secs_f64());

    if !stats.is_complete() && stats.sitemaps_pending > 0 {
        tracing::info!("Run is incomplete; use --resume to continue from the state file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_state() {
        let mut state = TraversalState::seeded("child2.xml");
        state.mark_processed("index.xml");
        state.record_found("pageA");
        state.record_found("pageB");

        let stats = RunStatistics::from_state(
            StopReason::LimitReached,
            &state,
            1,
            Duration::from_secs(3),
        );

        assert_eq!(stats.sitemaps_processed, 1);
        assert_eq!(stats.sitemaps_failed, 1);
        assert_eq!(stats.sitemaps_pending, 1);
        assert_eq!(stats.urls_found, 2);
        assert!(!stats.is_complete());
    }

    #[test]
    fn test_is_complete() {
        let state = TraversalState::new();
        let stats =
            RunStatistics::from_state(StopReason::Exhausted, &state, 0, Duration::ZERO);

        assert!(stats.is_complete());
    }
}
