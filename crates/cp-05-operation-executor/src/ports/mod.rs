//! Ports for the operation executor.

pub mod outbound;

pub use outbound::{ContractError, PayrollContract, ReadinessGate, StaticGate};
