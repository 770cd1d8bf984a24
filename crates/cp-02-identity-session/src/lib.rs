//! # CP-02 Identity Session
//!
//! Backend session lifecycle for the payroll client core.
//!
//! ## Purpose
//!
//! Hold the authenticated user profile obtained from the backend, with a
//! lifecycle independent of the wallet. Sign-in is an explicit
//! challenge-nonce + wallet-signature exchange; no passwords exist for
//! wallet-based accounts.
//!
//! The network half of sign-in (`authenticate`) is separated from the
//! commit half (`adopt`) so the readiness coordinator can discard a
//! sign-in that completes after the wallet has already disconnected.
//!
//! ## Module Structure
//!
//! ```text
//! cp-02-identity-session/
//! ├── domain/          # Session, Profile, Role, SessionError
//! ├── ports/           # AuthBackend + ChallengeSigner traits, in-memory backend
//! └── application/     # SessionService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::SessionService;
pub use domain::{Profile, Role, Session, SessionError};
pub use ports::{
    challenge_message, AuthBackend, ChallengeSigner, InMemoryAuthBackend, LoginChallenge,
    NewAccount, ProfileUpdate, SessionDto,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
