//! # Outbound Ports
//!
//! The payroll contract surface and the readiness gate.

use async_trait::async_trait;
use cp_03_confidential_channel::ConfidentialValue;
use shared_types::{Address, CiphertextHandle, TxHash};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors from the remote contract call path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The wallet rejected the transaction before submission.
    #[error("Transaction rejected by the wallet")]
    Rejected,

    /// The transaction was submitted but failed on-chain.
    #[error("Transaction failed: {0}")]
    Failed(String),
}

/// The payroll contract - outbound port.
///
/// Money-moving calls consume a `ConfidentialValue` by move: one encrypted
/// value, one submission. Reads return ciphertext handles only; plaintext
/// never crosses this boundary.
#[async_trait]
pub trait PayrollContract: Send + Sync {
    /// Deposit encrypted funds into the company pool.
    async fn deposit(
        &self,
        employer: &Address,
        value: ConfidentialValue,
    ) -> Result<TxHash, ContractError>;

    /// Open a salary stream with an encrypted per-period salary.
    async fn create_stream(
        &self,
        employer: &Address,
        employee: &Address,
        salary: ConfidentialValue,
    ) -> Result<TxHash, ContractError>;

    /// Replace a stream's encrypted salary.
    async fn update_stream(
        &self,
        employer: &Address,
        employee: &Address,
        salary: ConfidentialValue,
    ) -> Result<TxHash, ContractError>;

    /// Withdraw the caller's accrued balance. No ciphertext travels.
    async fn withdraw(&self, employee: &Address) -> Result<TxHash, ContractError>;

    /// Pause or resume a stream.
    async fn set_stream_active(
        &self,
        employer: &Address,
        employee: &Address,
        active: bool,
    ) -> Result<TxHash, ContractError>;

    /// Whether a stream is currently active.
    async fn is_stream_active(
        &self,
        employer: &Address,
        employee: &Address,
    ) -> Result<bool, ContractError>;

    /// Handle of an account's encrypted withdrawable balance.
    async fn encrypted_balance(&self, account: &Address) -> Result<CiphertextHandle, ContractError>;

    /// Handle of a stream's encrypted salary.
    async fn encrypted_salary(
        &self,
        employer: &Address,
        employee: &Address,
    ) -> Result<CiphertextHandle, ContractError>;

    /// Handle of an employer's encrypted remaining pool.
    async fn encrypted_company_funds(
        &self,
        employer: &Address,
    ) -> Result<CiphertextHandle, ContractError>;
}

/// Readiness gate - outbound port.
///
/// Implemented over the readiness coordinator at wiring time; the executor
/// refuses confidential work while the gate is closed.
pub trait ReadinessGate: Send + Sync {
    /// Whether confidential operations are permitted right now.
    fn is_ready(&self) -> bool;
}

/// Fixed gate for tests.
pub struct StaticGate {
    ready: AtomicBool,
}

impl StaticGate {
    /// Create a gate in the given position.
    #[must_use]
    pub fn new(ready: bool) -> Self {
        Self {
            ready: AtomicBool::new(ready),
        }
    }

    /// Move the gate.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }
}

impl ReadinessGate for StaticGate {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_gate() {
        let gate = StaticGate::new(false);
        assert!(!gate.is_ready());
        gate.set_ready(true);
        assert!(gate.is_ready());
    }
}
