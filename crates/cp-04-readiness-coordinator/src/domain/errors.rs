//! # Domain Errors
//!
//! Error types for the readiness coordinator.

use thiserror::Error;

/// Readiness coordinator error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// Retry requested with no wallet connected.
    #[error("No wallet connected")]
    NotConnected,

    /// Retry requested while the phase is still in flight or already done.
    #[error("Nothing to retry in state {0}")]
    NothingToRetry(String),
}
