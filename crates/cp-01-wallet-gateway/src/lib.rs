//! # CP-01 Wallet Gateway
//!
//! Browser wallet integration for the payroll client core.
//!
//! ## Purpose
//!
//! Track whether a wallet is connected and which account is active, and
//! translate provider callbacks (connect, account change, disconnect) into
//! bus events that drive the readiness coordinator. The gateway owns
//! `WalletState`; every other subsystem reads it through snapshots.
//!
//! ## Module Structure
//!
//! ```text
//! cp-01-wallet-gateway/
//! ├── domain/          # WalletState, WalletError
//! ├── algorithms/      # Injected-provider selection
//! ├── ports/           # WalletProvider trait + mock
//! └── application/     # WalletGateway service
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{select_provider, ProviderDescriptor};
pub use application::WalletGateway;
pub use domain::{WalletError, WalletState};
pub use ports::{MockWalletProvider, WalletProvider};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
