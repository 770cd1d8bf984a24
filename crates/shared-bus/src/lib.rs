//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! All cross-subsystem notifications in the payroll client core flow through
//! this bus: wallet connect/disconnect, session establishment and teardown,
//! channel initialization, readiness changes, and operation outcomes.
//!
//! Subsystems never call each other directly for notifications; they publish
//! an event, and interested subsystems subscribe with a topic filter. The
//! causal chain (event → transition → side effect) stays inspectable.
//!
//! ```text
//! ┌────────────────┐                    ┌────────────────┐
//! │ Wallet Gateway │                    │  Coordinator   │
//! │                │    publish()       │                │
//! │                │ ──────┐            │                │
//! └────────────────┘       │            └────────────────┘
//!                          ▼                    ↑
//!                    ┌──────────────┐          │
//!                    │  Event Bus   │          │
//!                    │              │ ─────────┘
//!                    └──────────────┘  subscribe()
//! ```
//!
//! Events carry addresses and transaction hashes only; plaintext amounts,
//! ciphertext bytes, and proofs never ride the bus.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, PayrollEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
