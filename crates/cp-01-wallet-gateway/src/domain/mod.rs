//! Domain layer for the wallet gateway.

pub mod entities;
pub mod errors;

pub use entities::WalletState;
pub use errors::WalletError;
