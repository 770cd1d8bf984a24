//! # Operation Executor
//!
//! Runs the confidential submission pipeline: validate, encrypt, submit,
//! confirm. Money-moving operations and decrypting reads share one async
//! lock, so each encrypted value is produced for exactly one submission,
//! two operations never interleave their wallet prompts, and a read issued
//! behind an in-flight write observes the written state rather than the
//! handle it would have fetched mid-write.
//!
//! Amounts stay in memory: arguments, return values, and the in-memory
//! operation records. They are never logged.

use crate::algorithms::validate_amount;
use crate::domain::{ExecutorError, OperationKind, OperationStatus, PendingOperation};
use crate::ports::{ContractError, PayrollContract, ReadinessGate};
use cp_03_confidential_channel::{ChannelError, ChannelService};
use shared_bus::{EventPublisher, InMemoryEventBus, PayrollEvent};
use shared_types::{Address, TxHash};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Operation executor - the only path that submits confidential values.
pub struct OperationExecutor {
    /// Encryption channel.
    channel: Arc<ChannelService>,
    /// The payroll contract.
    contract: Arc<dyn PayrollContract>,
    /// Readiness gate over the coordinator.
    gate: Arc<dyn ReadinessGate>,
    /// Event bus for operation outcomes.
    bus: Arc<InMemoryEventBus>,
    /// Serializes money-moving operations and decrypting reads.
    op_lock: AsyncMutex<()>,
    /// Lifecycle records, newest last.
    operations: parking_lot::Mutex<Vec<PendingOperation>>,
}

impl OperationExecutor {
    /// Create an executor.
    pub fn new(
        channel: Arc<ChannelService>,
        contract: Arc<dyn PayrollContract>,
        gate: Arc<dyn ReadinessGate>,
        bus: Arc<InMemoryEventBus>,
    ) -> Self {
        Self {
            channel,
            contract,
            gate,
            bus,
            op_lock: AsyncMutex::new(()),
            operations: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all operation records.
    #[must_use]
    pub fn operations(&self) -> Vec<PendingOperation> {
        self.operations.lock().clone()
    }

    /// Deposit funds into the employer pool.
    pub async fn deposit(&self, employer: &Address, amount: u64) -> Result<TxHash, ExecutorError> {
        let id = self.begin(OperationKind::Deposit, Some(amount), None);
        if let Err(e) = validate_amount(amount) {
            return self.fail(id, e).await;
        }
        if !self.gate.is_ready() {
            return self.fail(id, ExecutorError::ChannelNotReady).await;
        }

        let _serial = self.op_lock.lock().await;
        let value = match self.channel.encrypt(amount).await {
            Ok(value) => value,
            Err(e) => return self.fail(id, map_channel(e)).await,
        };
        match self.contract.deposit(employer, value).await {
            Ok(tx) => self.confirm(id, tx).await,
            Err(e) => self.fail(id, map_contract(e)).await,
        }
    }

    /// Open a salary stream with an encrypted salary.
    pub async fn create_stream(
        &self,
        employer: &Address,
        employee: &Address,
        salary: u64,
    ) -> Result<TxHash, ExecutorError> {
        let id = self.begin(
            OperationKind::CreateStream,
            Some(salary),
            Some(employee.clone()),
        );
        if let Err(e) = validate_amount(salary) {
            return self.fail(id, e).await;
        }
        if !self.gate.is_ready() {
            return self.fail(id, ExecutorError::ChannelNotReady).await;
        }

        let _serial = self.op_lock.lock().await;
        let value = match self.channel.encrypt(salary).await {
            Ok(value) => value,
            Err(e) => return self.fail(id, map_channel(e)).await,
        };
        match self.contract.create_stream(employer, employee, value).await {
            Ok(tx) => self.confirm(id, tx).await,
            Err(e) => self.fail(id, map_contract(e)).await,
        }
    }

    /// Replace a stream's encrypted salary.
    pub async fn update_stream(
        &self,
        employer: &Address,
        employee: &Address,
        salary: u64,
    ) -> Result<TxHash, ExecutorError> {
        let id = self.begin(
            OperationKind::UpdateStream,
            Some(salary),
            Some(employee.clone()),
        );
        if let Err(e) = validate_amount(salary) {
            return self.fail(id, e).await;
        }
        if !self.gate.is_ready() {
            return self.fail(id, ExecutorError::ChannelNotReady).await;
        }

        let _serial = self.op_lock.lock().await;
        let value = match self.channel.encrypt(salary).await {
            Ok(value) => value,
            Err(e) => return self.fail(id, map_channel(e)).await,
        };
        match self.contract.update_stream(employer, employee, value).await {
            Ok(tx) => self.confirm(id, tx).await,
            Err(e) => self.fail(id, map_contract(e)).await,
        }
    }

    /// Withdraw the caller's accrued balance.
    ///
    /// No ciphertext travels, but the withdrawal still rides the readiness
    /// gate and the serial lock like every other money-moving operation.
    pub async fn withdraw(&self, employee: &Address) -> Result<TxHash, ExecutorError> {
        let id = self.begin(OperationKind::Withdraw, None, None);
        if !self.gate.is_ready() {
            return self.fail(id, ExecutorError::ChannelNotReady).await;
        }

        let _serial = self.op_lock.lock().await;
        match self.contract.withdraw(employee).await {
            Ok(tx) => self.confirm(id, tx).await,
            Err(e) => self.fail(id, map_contract(e)).await,
        }
    }

    /// Pause or resume a stream. Carries no confidential value.
    pub async fn set_stream_active(
        &self,
        employer: &Address,
        employee: &Address,
        active: bool,
    ) -> Result<TxHash, ExecutorError> {
        self.contract
            .set_stream_active(employer, employee, active)
            .await
            .map_err(map_contract)
    }

    /// Whether a stream is currently active.
    pub async fn is_stream_active(
        &self,
        employer: &Address,
        employee: &Address,
    ) -> Result<bool, ExecutorError> {
        self.contract
            .is_stream_active(employer, employee)
            .await
            .map_err(map_contract)
    }

    /// Read and decrypt an account's withdrawable balance.
    ///
    /// One wallet prompt per read; the plaintext goes to the caller and
    /// nowhere else. Waits for any in-flight money-moving operation before
    /// fetching the handle.
    pub async fn balance(&self, account: &Address) -> Result<u64, ExecutorError> {
        if !self.gate.is_ready() {
            return Err(ExecutorError::ChannelNotReady);
        }
        let _serial = self.op_lock.lock().await;
        let handle = self
            .contract
            .encrypted_balance(account)
            .await
            .map_err(map_contract)?;
        self.channel.decrypt(&handle).await.map_err(map_channel)
    }

    /// Read and decrypt a stream's salary.
    pub async fn salary(
        &self,
        employer: &Address,
        employee: &Address,
    ) -> Result<u64, ExecutorError> {
        if !self.gate.is_ready() {
            return Err(ExecutorError::ChannelNotReady);
        }
        let _serial = self.op_lock.lock().await;
        let handle = self
            .contract
            .encrypted_salary(employer, employee)
            .await
            .map_err(map_contract)?;
        self.channel.decrypt(&handle).await.map_err(map_channel)
    }

    /// Read and decrypt an employer's remaining pool.
    pub async fn company_funds(&self, employer: &Address) -> Result<u64, ExecutorError> {
        if !self.gate.is_ready() {
            return Err(ExecutorError::ChannelNotReady);
        }
        let _serial = self.op_lock.lock().await;
        let handle = self
            .contract
            .encrypted_company_funds(employer)
            .await
            .map_err(map_contract)?;
        self.channel.decrypt(&handle).await.map_err(map_channel)
    }

    fn begin(&self, kind: OperationKind, amount: Option<u64>, target: Option<Address>) -> Uuid {
        let op = PendingOperation::new(kind, amount, target);
        let id = op.id;
        debug!(kind = %kind, id = %id, "Operation started");
        self.operations.lock().push(op);
        id
    }

    async fn confirm(&self, id: Uuid, tx: TxHash) -> Result<TxHash, ExecutorError> {
        self.update(id, |op| {
            if op.transition_to(OperationStatus::Confirmed) {
                op.tx_hash = Some(tx.clone());
            }
        });
        info!(tx_hash = %tx, "Operation confirmed");
        self.bus
            .publish(PayrollEvent::OperationConfirmed {
                tx_hash: tx.clone(),
            })
            .await;
        Ok(tx)
    }

    async fn fail(&self, id: Uuid, error: ExecutorError) -> Result<TxHash, ExecutorError> {
        self.update(id, |op| {
            if op.transition_to(OperationStatus::Failed) {
                op.error = Some(error.to_string());
            }
        });
        warn!(error = %error, "Operation failed");
        self.bus
            .publish(PayrollEvent::OperationFailed {
                reason: error.to_string(),
            })
            .await;
        Err(error)
    }

    fn update(&self, id: Uuid, f: impl FnOnce(&mut PendingOperation)) {
        let mut ops = self.operations.lock();
        if let Some(op) = ops.iter_mut().find(|o| o.id == id) {
            f(op);
        }
    }
}

fn map_channel(e: ChannelError) -> ExecutorError {
    match e {
        ChannelError::NotReady => ExecutorError::ChannelNotReady,
        ChannelError::AuthorizationDenied => ExecutorError::AuthorizationDenied,
        other => ExecutorError::Encryption(other.to_string()),
    }
}

fn map_contract(e: ContractError) -> ExecutorError {
    match e {
        ContractError::Rejected => ExecutorError::TransactionRejected,
        ContractError::Failed(reason) => ExecutorError::TransactionFailed(reason),
    }
}
