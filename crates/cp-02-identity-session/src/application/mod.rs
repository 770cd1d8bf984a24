//! Application layer for the identity session.

pub mod service;

pub use service::SessionService;
