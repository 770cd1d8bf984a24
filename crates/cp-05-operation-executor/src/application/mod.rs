//! Application layer for the operation executor.

pub mod executor;

pub use executor::OperationExecutor;
