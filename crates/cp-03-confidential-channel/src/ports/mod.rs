//! Ports for the confidential channel.

pub mod outbound;

pub use outbound::{FheProvider, InMemoryFheProvider, WalletSigner};
