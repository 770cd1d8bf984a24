//! # Domain Errors
//!
//! Error types for the operation executor.

use thiserror::Error;

/// Operation executor error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// The amount failed local validation. Nothing left the client.
    #[error("Invalid amount: {0}")]
    Validation(String),

    /// The readiness gate is closed or the channel is not initialized.
    #[error("Confidential operations are not ready")]
    ChannelNotReady,

    /// The user declined the decrypt authorization signature.
    #[error("Decrypt authorization denied")]
    AuthorizationDenied,

    /// The wallet rejected the transaction before submission.
    #[error("Transaction rejected by the wallet")]
    TransactionRejected,

    /// The submitted transaction failed on-chain.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Encrypting or decrypting through the channel failed.
    #[error("Encryption error: {0}")]
    Encryption(String),
}
