//! Domain layer for the readiness coordinator.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use entities::ReadinessSignal;
pub use errors::CoordinatorError;
pub use value_objects::ReadinessState;
