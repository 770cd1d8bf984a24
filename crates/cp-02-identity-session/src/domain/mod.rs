//! Domain layer for the identity session.

pub mod entities;
pub mod errors;

pub use entities::{Profile, Role, Session};
pub use errors::SessionError;
