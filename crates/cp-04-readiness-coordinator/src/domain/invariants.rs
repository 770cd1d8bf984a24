//! # Domain Invariants
//!
//! Business rules the coordinator upholds across subsystems.

use super::value_objects::ReadinessState;

/// Invariant: `Ready` means a session exists AND the channel is initialized.
///
/// Checked after every ladder move; a violation means an event was applied
/// out of order.
#[must_use]
pub fn invariant_ready_is_consistent(
    state: ReadinessState,
    has_session: bool,
    channel_initialized: bool,
) -> bool {
    state != ReadinessState::Ready || (has_session && channel_initialized)
}

/// Invariant: after a disconnect teardown, nothing survives.
///
/// No session, no channel, and the ladder back at `Idle`.
#[must_use]
pub fn invariant_teardown_complete(
    state: ReadinessState,
    has_session: bool,
    channel_initialized: bool,
) -> bool {
    state == ReadinessState::Idle && !has_session && !channel_initialized
}
