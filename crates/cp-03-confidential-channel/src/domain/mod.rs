//! Domain layer for the confidential channel.

pub mod entities;
pub mod errors;

pub use entities::{ChannelState, ConfidentialValue, SignedAuthorization};
pub use errors::ChannelError;
