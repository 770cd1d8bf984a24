//! # In-Memory Payroll Contract
//!
//! Contract adapter for tests. Shares an `InMemoryFheProvider` with the
//! channel so deposited handles resolve to real values, and models the
//! contract-side arithmetic with the provider's homomorphic helpers.

use crate::ports::{ContractError, PayrollContract};
use async_trait::async_trait;
use cp_03_confidential_channel::{ConfidentialValue, InMemoryFheProvider};
use parking_lot::Mutex;
use shared_types::{Address, CiphertextHandle, TxHash};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct StreamRecord {
    salary: CiphertextHandle,
    active: bool,
}

/// In-memory payroll contract.
pub struct InMemoryPayrollContract {
    /// FHE provider shared with the channel under test.
    fhe: Arc<InMemoryFheProvider>,
    /// Employer pool handles.
    company_funds: Mutex<HashMap<Address, CiphertextHandle>>,
    /// Withdrawable balance handles.
    balances: Mutex<HashMap<Address, CiphertextHandle>>,
    /// Streams keyed by (employer, employee).
    streams: Mutex<HashMap<(Address, Address), StreamRecord>>,
    /// Count of ciphertext-carrying submissions.
    submissions: AtomicU64,
    /// Transaction counter for hash generation.
    tx_counter: AtomicU64,
    /// Error injected into the next state-changing call.
    fail_next: Mutex<Option<ContractError>>,
}

impl InMemoryPayrollContract {
    /// Create a contract over a shared FHE provider.
    #[must_use]
    pub fn new(fhe: Arc<InMemoryFheProvider>) -> Self {
        Self {
            fhe,
            company_funds: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            streams: Mutex::new(HashMap::new()),
            submissions: AtomicU64::new(0),
            tx_counter: AtomicU64::new(0),
            fail_next: Mutex::new(None),
        }
    }

    /// Number of ciphertext-carrying submissions received.
    #[must_use]
    pub fn submissions(&self) -> u64 {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Inject an error into the next state-changing call.
    pub fn set_fail_next(&self, error: ContractError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Apply one payroll tick: move the stream salary from the employer
    /// pool into the employee balance. Test helper.
    pub fn accrue(&self, employer: &Address, employee: &Address) -> Result<(), ContractError> {
        let salary = {
            let streams = self.streams.lock();
            let record = streams
                .get(&(employer.clone(), employee.clone()))
                .ok_or_else(|| ContractError::Failed("no such stream".to_string()))?;
            if !record.active {
                return Err(ContractError::Failed("stream paused".to_string()));
            }
            record.salary.clone()
        };

        let balance = self.balance_handle(employee);
        let credited = self
            .fhe
            .add_handles(&balance, &salary)
            .map_err(|e| ContractError::Failed(e.to_string()))?;
        self.balances.lock().insert(employee.clone(), credited);

        let pool = self.funds_handle(employer);
        let debited = self
            .fhe
            .sub_handles(&pool, &salary)
            .map_err(|e| ContractError::Failed(e.to_string()))?;
        self.company_funds.lock().insert(employer.clone(), debited);
        Ok(())
    }

    fn take_injected_failure(&self) -> Result<(), ContractError> {
        match self.fail_next.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_tx_hash(&self) -> TxHash {
        use sha2::{Digest, Sha256};
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(b"payroll-tx");
        hasher.update(n.to_be_bytes());
        TxHash::from_bytes(hasher.finalize().into())
    }

    fn funds_handle(&self, employer: &Address) -> CiphertextHandle {
        self.company_funds
            .lock()
            .entry(employer.clone())
            .or_insert_with(|| self.fhe.mint_handle(0))
            .clone()
    }

    fn balance_handle(&self, account: &Address) -> CiphertextHandle {
        self.balances
            .lock()
            .entry(account.clone())
            .or_insert_with(|| self.fhe.mint_handle(0))
            .clone()
    }
}

#[async_trait]
impl PayrollContract for InMemoryPayrollContract {
    async fn deposit(
        &self,
        employer: &Address,
        value: ConfidentialValue,
    ) -> Result<TxHash, ContractError> {
        self.take_injected_failure()?;
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let (handle, _proof) = value.into_parts();
        let pool = self.funds_handle(employer);
        let credited = self
            .fhe
            .add_handles(&pool, &handle)
            .map_err(|e| ContractError::Failed(e.to_string()))?;
        self.company_funds.lock().insert(employer.clone(), credited);
        Ok(self.next_tx_hash())
    }

    async fn create_stream(
        &self,
        employer: &Address,
        employee: &Address,
        salary: ConfidentialValue,
    ) -> Result<TxHash, ContractError> {
        self.take_injected_failure()?;
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let (handle, _proof) = salary.into_parts();
        self.streams.lock().insert(
            (employer.clone(), employee.clone()),
            StreamRecord {
                salary: handle,
                active: true,
            },
        );
        Ok(self.next_tx_hash())
    }

    async fn update_stream(
        &self,
        employer: &Address,
        employee: &Address,
        salary: ConfidentialValue,
    ) -> Result<TxHash, ContractError> {
        self.take_injected_failure()?;
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let (handle, _proof) = salary.into_parts();
        let mut streams = self.streams.lock();
        let record = streams
            .get_mut(&(employer.clone(), employee.clone()))
            .ok_or_else(|| ContractError::Failed("no such stream".to_string()))?;
        record.salary = handle;
        Ok(self.next_tx_hash())
    }

    async fn withdraw(&self, employee: &Address) -> Result<TxHash, ContractError> {
        self.take_injected_failure()?;

        // Balance moves out to the token; the remaining balance is zero.
        self.balances
            .lock()
            .insert(employee.clone(), self.fhe.mint_handle(0));
        Ok(self.next_tx_hash())
    }

    async fn set_stream_active(
        &self,
        employer: &Address,
        employee: &Address,
        active: bool,
    ) -> Result<TxHash, ContractError> {
        self.take_injected_failure()?;

        let mut streams = self.streams.lock();
        let record = streams
            .get_mut(&(employer.clone(), employee.clone()))
            .ok_or_else(|| ContractError::Failed("no such stream".to_string()))?;
        record.active = active;
        Ok(self.next_tx_hash())
    }

    async fn is_stream_active(
        &self,
        employer: &Address,
        employee: &Address,
    ) -> Result<bool, ContractError> {
        let streams = self.streams.lock();
        streams
            .get(&(employer.clone(), employee.clone()))
            .map(|r| r.active)
            .ok_or_else(|| ContractError::Failed("no such stream".to_string()))
    }

    async fn encrypted_balance(&self, account: &Address) -> Result<CiphertextHandle, ContractError> {
        Ok(self.balance_handle(account))
    }

    async fn encrypted_salary(
        &self,
        employer: &Address,
        employee: &Address,
    ) -> Result<CiphertextHandle, ContractError> {
        let streams = self.streams.lock();
        streams
            .get(&(employer.clone(), employee.clone()))
            .map(|r| r.salary.clone())
            .ok_or_else(|| ContractError::Failed("no such stream".to_string()))
    }

    async fn encrypted_company_funds(
        &self,
        employer: &Address,
    ) -> Result<CiphertextHandle, ContractError> {
        Ok(self.funds_handle(employer))
    }
}
