//! # Domain Entities
//!
//! The observable readiness signal.

use super::value_objects::ReadinessState;
use serde::{Deserialize, Serialize};

/// Snapshot consumers observe through the coordinator's watch channel.
///
/// `slow` flips on when a transient phase outlives the soft timeout; the
/// phase itself keeps running.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessSignal {
    /// Current rung of the ladder.
    pub state: ReadinessState,
    /// Whether confidential operations are permitted.
    pub ready: bool,
    /// Soft-timeout warning for the current transient phase.
    pub slow: bool,
    /// Last phase error, if any.
    pub error: Option<String>,
}

impl ReadinessSignal {
    /// Signal for a fresh coordinator.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            state: ReadinessState::Idle,
            ready: false,
            slow: false,
            error: None,
        }
    }

    /// Signal for a state with no warning and no error.
    #[must_use]
    pub fn at(state: ReadinessState) -> Self {
        Self {
            state,
            ready: state.is_ready(),
            slow: false,
            error: None,
        }
    }
}

impl Default for ReadinessSignal {
    fn default() -> Self {
        Self::idle()
    }
}
