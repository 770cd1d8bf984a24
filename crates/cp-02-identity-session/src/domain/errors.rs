//! # Domain Errors
//!
//! Error types for session sign-in and lifecycle.

use thiserror::Error;

/// Session error types.
///
/// These are surfaced to the UI as banners/toasts; the coordinator reverts
/// to its pre-attempt state and never retries silently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No account is registered for the wallet address.
    #[error("No account registered for wallet {0}")]
    UnknownWallet(String),

    /// The user rejected the login signature request.
    #[error("Login signature rejected")]
    SignatureRejected,

    /// The backend rejected the signed challenge.
    #[error("Challenge verification failed")]
    VerificationFailed,

    /// No live session for an operation that requires one.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// An account already exists for the wallet address.
    #[error("Account already exists for wallet {0}")]
    AlreadyRegistered(String),

    /// Backend request failed.
    #[error("Auth backend error: {0}")]
    Backend(String),
}
