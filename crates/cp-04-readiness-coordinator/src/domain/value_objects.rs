//! # Domain Value Objects
//!
//! The readiness ladder and its legal transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate readiness of the wallet/session/channel stack.
///
/// The ladder climbs one rung per completed phase; disconnect drops it back
/// to `Idle` from anywhere, and an account switch resets it to `Connected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    /// No wallet connected.
    Idle,
    /// Wallet connected, no session yet.
    Connected,
    /// Challenge/sign exchange in progress.
    Authenticating,
    /// Session established for the active wallet.
    Authenticated,
    /// Channel initialization in progress.
    Initializing,
    /// Everything lined up; confidential operations permitted.
    Ready,
    /// A phase failed; waiting for an explicit retry or disconnect.
    Faulted,
}

impl ReadinessState {
    /// Whether `to` is a legal next state.
    #[must_use]
    pub fn can_transition_to(&self, to: ReadinessState) -> bool {
        use ReadinessState::*;
        match (*self, to) {
            // Disconnect wins from anywhere.
            (_, Idle) => true,
            (Idle, Connected) => true,
            // Account switch or regression resets to Connected.
            (s, Connected) if s != Idle => true,
            (Connected, Authenticating) => true,
            // Session already live for this wallet.
            (Connected, Authenticated) => true,
            (Authenticating, Authenticated) => true,
            (Authenticating, Faulted) => true,
            (Authenticated, Initializing) => true,
            // Channel already initialized for this contract.
            (Authenticated, Ready) => true,
            (Initializing, Ready) => true,
            (Initializing, Faulted) => true,
            // Channel invalidated while ready.
            (Ready, Authenticated) => true,
            (Faulted, Authenticating) => true,
            (Faulted, Initializing) => true,
            _ => false,
        }
    }

    /// Whether this state represents in-flight work.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ReadinessState::Authenticating | ReadinessState::Initializing
        )
    }

    /// Whether confidential operations are permitted.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadinessState::Ready)
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReadinessState::Idle => "idle",
            ReadinessState::Connected => "connected",
            ReadinessState::Authenticating => "authenticating",
            ReadinessState::Authenticated => "authenticated",
            ReadinessState::Initializing => "initializing",
            ReadinessState::Ready => "ready",
            ReadinessState::Faulted => "faulted",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReadinessState::*;

    #[test]
    fn test_happy_path_is_legal() {
        assert!(Idle.can_transition_to(Connected));
        assert!(Connected.can_transition_to(Authenticating));
        assert!(Authenticating.can_transition_to(Authenticated));
        assert!(Authenticated.can_transition_to(Initializing));
        assert!(Initializing.can_transition_to(Ready));
    }

    #[test]
    fn test_disconnect_from_anywhere() {
        for state in [Idle, Connected, Authenticating, Authenticated, Initializing, Ready, Faulted]
        {
            assert!(state.can_transition_to(Idle), "{state} -> idle");
        }
    }

    #[test]
    fn test_no_rung_skipping() {
        assert!(!Idle.can_transition_to(Ready));
        assert!(!Connected.can_transition_to(Ready));
        assert!(!Idle.can_transition_to(Authenticating));
        assert!(!Connected.can_transition_to(Initializing));
    }

    #[test]
    fn test_short_circuits() {
        // Session already live for this wallet
        assert!(Connected.can_transition_to(Authenticated));
        // Channel already initialized
        assert!(Authenticated.can_transition_to(Ready));
    }

    #[test]
    fn test_faulted_allows_retry() {
        assert!(Authenticating.can_transition_to(Faulted));
        assert!(Initializing.can_transition_to(Faulted));
        assert!(Faulted.can_transition_to(Authenticating));
        assert!(Faulted.can_transition_to(Initializing));
    }

    #[test]
    fn test_account_switch_resets_to_connected() {
        assert!(Ready.can_transition_to(Connected));
        assert!(Authenticating.can_transition_to(Connected));
        assert!(!Idle.can_transition_to(Authenticated));
    }

    #[test]
    fn test_transient_states() {
        assert!(Authenticating.is_transient());
        assert!(Initializing.is_transient());
        assert!(!Ready.is_transient());
        assert!(!Faulted.is_transient());
    }
}
