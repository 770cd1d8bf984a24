//! # Domain Entities
//!
//! Operation kinds and the per-operation lifecycle record.

use serde::{Deserialize, Serialize};
use shared_types::{Address, TxHash};
use std::fmt;
use uuid::Uuid;

/// The contract operations the executor can submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Company deposits encrypted funds.
    Deposit,
    /// Company opens a salary stream for an employee.
    CreateStream,
    /// Company changes a stream's encrypted salary.
    UpdateStream,
    /// Employee withdraws accrued balance. Carries no ciphertext.
    Withdraw,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::Deposit => "deposit",
            OperationKind::CreateStream => "create_stream",
            OperationKind::UpdateStream => "update_stream",
            OperationKind::Withdraw => "withdraw",
        };
        write!(f, "{label}")
    }
}

/// Lifecycle status of one submitted operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Initiated, outcome not yet known.
    Pending,
    /// Confirmed on-chain.
    Confirmed,
    /// Failed before or after submission.
    Failed,
}

impl OperationStatus {
    /// Whether `to` is a legal next status.
    ///
    /// A record settles exactly once: `Pending` to one of the terminal
    /// statuses, never back, never between them.
    #[must_use]
    pub fn can_transition_to(&self, to: OperationStatus) -> bool {
        use OperationStatus::*;
        matches!((*self, to), (Pending, Confirmed) | (Pending, Failed))
    }

    /// Whether this status is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Confirmed | OperationStatus::Failed)
    }
}

/// One operation's journey through the pipeline.
///
/// The plaintext amount lives here in memory only; it is never logged
/// and never leaves the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Unique operation id.
    pub id: Uuid,
    /// What was submitted.
    pub kind: OperationKind,
    /// Plaintext amount, when the operation carries one.
    pub amount: Option<u64>,
    /// Counterparty address, when the operation targets one.
    pub target: Option<Address>,
    /// Current lifecycle status.
    pub status: OperationStatus,
    /// Transaction hash once confirmed.
    pub tx_hash: Option<TxHash>,
    /// Failure reason, if failed.
    pub error: Option<String>,
}

impl PendingOperation {
    /// Start a new operation record.
    #[must_use]
    pub fn new(kind: OperationKind, amount: Option<u64>, target: Option<Address>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            target,
            status: OperationStatus::Pending,
            tx_hash: None,
            error: None,
        }
    }

    /// Apply a guarded status transition. Returns false when illegal.
    pub fn transition_to(&mut self, status: OperationStatus) -> bool {
        if !self.status.can_transition_to(status) {
            return false;
        }
        self.status = status;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_settles_once() {
        assert!(OperationStatus::Pending.can_transition_to(OperationStatus::Confirmed));
        assert!(OperationStatus::Pending.can_transition_to(OperationStatus::Failed));
        assert!(!OperationStatus::Confirmed.can_transition_to(OperationStatus::Failed));
        assert!(!OperationStatus::Failed.can_transition_to(OperationStatus::Confirmed));
        assert!(!OperationStatus::Confirmed.can_transition_to(OperationStatus::Pending));
    }

    #[test]
    fn test_operation_transition_guard() {
        let mut op = PendingOperation::new(OperationKind::Deposit, Some(100), None);
        assert!(op.transition_to(OperationStatus::Confirmed));
        assert!(!op.transition_to(OperationStatus::Failed));
        assert!(op.status.is_terminal());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(OperationKind::CreateStream.to_string(), "create_stream");
    }
}
