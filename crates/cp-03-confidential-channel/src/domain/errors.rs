//! # Domain Errors
//!
//! Error types for the confidential channel.

use thiserror::Error;

/// Confidential channel error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Encrypt/decrypt attempted before initialization.
    #[error("Channel not ready")]
    NotReady,

    /// Initialization attempted with no signer available.
    #[error("Channel initialization requires a connected wallet signer")]
    NoSigner,

    /// Initialization failed.
    #[error("Channel initialization failed: {0}")]
    InitFailed(String),

    /// The user rejected the decrypt authorization signature.
    #[error("Decrypt authorization denied")]
    AuthorizationDenied,

    /// Encryption service failure.
    #[error("Encryption provider error: {0}")]
    Provider(String),
}
