//! Domain layer for the operation executor.

pub mod entities;
pub mod errors;

pub use entities::{OperationKind, OperationStatus, PendingOperation};
pub use errors::ExecutorError;
