//! Application layer for the wallet gateway.

pub mod gateway;

pub use gateway::WalletGateway;
