//! Algorithms for the wallet gateway.

pub mod detection;

pub use detection::{select_provider, ProviderDescriptor};
