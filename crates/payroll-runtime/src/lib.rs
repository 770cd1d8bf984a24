//! # Payroll Runtime
//!
//! Wires the payroll client core: one shared event bus, the five
//! subsystems built over it, and the seams between them (wallet-backed
//! signers, coordinator-backed readiness gate).
//!
//! Real deployments embed the subsystem crates behind host-provided
//! adapters; the bundled binary runs the core against the in-memory
//! adapters.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod logging;
pub mod wiring;

// Re-exports
pub use config::{AppConfig, ConfigError};
pub use wiring::{InMemoryApp, PayrollApp};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
