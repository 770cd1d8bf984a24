//! # CP-03 Confidential Channel
//!
//! Wraps the external FHE capability: plaintext integers go in, single-use
//! ciphertext-handle/proof pairs come out, and on-chain handles come back
//! to plaintext only through a wallet-signed authorization.
//!
//! ## Rules
//!
//! - The channel must be initialized per contract address before any value
//!   can be encrypted or decrypted; initialization requires a signer.
//! - An encrypted value is consumed by exactly one contract call; the
//!   `ConfidentialValue` type is not `Clone`, so a cached resend does not
//!   compile.
//! - Every decrypt produces exactly one signature request; nothing is
//!   cached and nothing touches persistent storage.
//!
//! ## Module Structure
//!
//! ```text
//! cp-03-confidential-channel/
//! ├── domain/          # ChannelState, ConfidentialValue, SignedAuthorization, errors
//! ├── ports/           # FheProvider + WalletSigner traits, in-memory provider
//! └── application/     # ChannelService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::ChannelService;
pub use domain::{ChannelError, ChannelState, ConfidentialValue, SignedAuthorization};
pub use ports::{FheProvider, InMemoryFheProvider, WalletSigner};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
