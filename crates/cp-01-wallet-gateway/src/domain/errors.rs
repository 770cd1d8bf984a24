//! # Domain Errors
//!
//! Error types for wallet connection and signing.

use thiserror::Error;

/// Wallet gateway error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No injected wallet provider was found.
    #[error("No wallet provider available")]
    ProviderUnavailable,

    /// The user rejected the connection request.
    #[error("Wallet connection rejected")]
    ConnectionRejected,

    /// The provider returned no accounts.
    #[error("Wallet exposed no accounts")]
    NoAccounts,

    /// The user rejected a signature request.
    #[error("Signature request rejected")]
    SignatureRejected,

    /// Provider-level failure.
    #[error("Wallet provider error: {0}")]
    Provider(String),
}
