//! # CP-05 Operation Executor
//!
//! The only path through which confidential values reach the payroll
//! contract: validate the plaintext locally, encrypt through the channel,
//! submit the handle/proof pair, and report the outcome on the bus.
//!
//! ## Rules
//!
//! - Money-moving operations require the readiness gate open and run one
//!   at a time behind a serial lock.
//! - Each encrypted value is consumed by exactly one submission; a failed
//!   submission re-encrypts on retry instead of resending.
//! - Withdraw carries no ciphertext but is gated and serialized like the
//!   rest.
//! - Balance reads decrypt through one wallet prompt and hand the
//!   plaintext straight to the caller; nothing is cached or logged.
//!
//! ## Module Structure
//!
//! ```text
//! cp-05-operation-executor/
//! ├── domain/          # OperationKind, PendingOperation, errors
//! ├── algorithms/      # Amount validation
//! ├── ports/           # PayrollContract + ReadinessGate traits
//! ├── adapters/        # In-memory contract for tests
//! └── application/     # OperationExecutor
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::InMemoryPayrollContract;
pub use algorithms::{validate_amount, MAX_AMOUNT};
pub use application::OperationExecutor;
pub use domain::{ExecutorError, OperationKind, OperationStatus, PendingOperation};
pub use ports::{ContractError, PayrollContract, ReadinessGate, StaticGate};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
