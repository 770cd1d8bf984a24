//! Application layer for the readiness coordinator.

pub mod coordinator;

pub use coordinator::ReadinessCoordinator;
