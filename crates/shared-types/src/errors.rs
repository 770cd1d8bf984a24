//! # Shared Type Errors
//!
//! Parse errors for the common value types.

use thiserror::Error;

/// Errors from parsing shared value types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Malformed wallet or contract address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed transaction hash.
    #[error("Invalid transaction hash: {0}")]
    InvalidTxHash(String),
}
