//! # Shared Types
//!
//! Common value types used by every payroll subsystem crate: wallet and
//! contract addresses, transaction hashes, ciphertext handles, and proofs.
//!
//! Plaintext amounts never appear here; everything that crosses a wire is
//! either profile metadata or an opaque encrypted reference.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entities;
pub mod errors;

pub use entities::{Address, CiphertextHandle, TxHash, ZkProof};
pub use errors::TypeError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
