//! Ports for the wallet gateway.

pub mod outbound;

pub use outbound::{MockWalletProvider, WalletProvider};
