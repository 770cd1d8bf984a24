//! Application layer for the confidential channel.

pub mod service;

pub use service::ChannelService;
