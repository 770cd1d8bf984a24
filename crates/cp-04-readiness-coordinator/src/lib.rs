//! # CP-04 Readiness Coordinator
//!
//! The synchronization heart of the payroll client: tracks whether the
//! wallet, backend session, and encryption channel line up, and gates
//! confidential operations on all three.
//!
//! ## Rules
//!
//! - The ladder climbs one rung at a time: connected, authenticated,
//!   channel initialized, ready. Disconnect drops it to idle from anywhere
//!   and tears the session and channel down unconditionally.
//! - At most one sign-in attempt and one channel init attempt are in
//!   flight, no matter how many wallet events arrive.
//! - Completions carry the wallet epoch they started under; a stale
//!   completion is discarded, never committed.
//! - Failed phases wait for an explicit retry. A rejected signature is
//!   never re-prompted automatically.
//!
//! ## Module Structure
//!
//! ```text
//! cp-04-readiness-coordinator/
//! ├── domain/          # ReadinessState ladder, ReadinessSignal, invariants
//! ├── config.rs        # Soft-timeout configuration
//! └── application/     # ReadinessCoordinator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;

// Re-exports
pub use application::ReadinessCoordinator;
pub use config::CoordinatorConfig;
pub use domain::{CoordinatorError, ReadinessSignal, ReadinessState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
