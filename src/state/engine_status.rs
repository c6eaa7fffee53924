/// Engine lifecycle definitions
///
/// This module defines the states the traversal engine moves through during a
/// run and the reasons a run can come to an end.
use std::fmt;

/// Represents the lifecycle state of the traversal engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    /// The engine has been created but `run` has not started the loop yet
    Idle,

    /// The main loop is active
    Running,

    /// The loop has ended (worklist exhausted, limit hit, or interrupt) and
    /// the engine is persisting state
    Stopping,

    /// Finalization has completed
    Terminated,
}

impl EngineStatus {
    /// Returns true if the main loop is active
    ///
    /// Interrupts received while running trigger a checkpoint save; interrupts
    /// received in any other state exit without saving.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: EngineStatus) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Stopping)
                | (Self::Stopping, Self::Terminated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The worklist ran dry
    Exhausted,

    /// The configured URL limit was reached
    LimitReached,

    /// A stop signal arrived while running; the checkpoint was saved and the
    /// output was not written
    Interrupted,

    /// A stop signal arrived while idle or stopping; nothing was saved
    Aborted,
}

impl StopReason {
    /// Returns true if the run went through the normal finalization path
    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Exhausted | Self::LimitReached)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "worklist exhausted",
            Self::LimitReached => "limit reached",
            Self::Interrupted => "interrupted",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_running() {
        assert!(EngineStatus::Running.is_running());

        assert!(!EngineStatus::Idle.is_running());
        assert!(!EngineStatus::Stopping.is_running());
        assert!(!EngineStatus::Terminated.is_running());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(EngineStatus::Idle.can_transition_to(EngineStatus::Running));
        assert!(EngineStatus::Running.can_transition_to(EngineStatus::Stopping));
        assert!(EngineStatus::Stopping.can_transition_to(EngineStatus::Terminated));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!EngineStatus::Idle.can_transition_to(EngineStatus::Stopping));
        assert!(!EngineStatus::Running.can_transition_to(EngineStatus::Idle));
        assert!(!EngineStatus::Running.can_transition_to(EngineStatus::Terminated));
        assert!(!EngineStatus::Terminated.can_transition_to(EngineStatus::Running));
        assert!(!EngineStatus::Stopping.can_transition_to(EngineStatus::Stopping));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EngineStatus::Idle), "idle");
        assert_eq!(format!("{}", EngineStatus::Stopping), "stopping");
        assert_eq!(format!("{}", StopReason::LimitReached), "limit reached");
    }

    #[test]
    fn test_stop_reason_finalized() {
        assert!(StopReason::Exhausted.is_finalized());
        assert!(StopReason::LimitReached.is_finalized());

        assert!(!StopReason::Interrupted.is_finalized());
        assert!(!StopReason::Aborted.is_finalized());
    }
}
