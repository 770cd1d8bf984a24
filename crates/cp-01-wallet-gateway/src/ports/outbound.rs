//! # Outbound Ports
//!
//! Trait for the injected browser wallet provider.

use crate::domain::WalletError;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::Address;

/// Injected wallet provider - outbound port.
///
/// Every call that requires user interaction (`request_accounts`,
/// `sign_message`) may suspend for an arbitrarily long time or never
/// resolve; callers must not hold locks across these awaits.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Provider name for diagnostics ("metamask", "rabby", ...).
    fn provider_name(&self) -> &str;

    /// Request account access; prompts the user on first call.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Currently authorized accounts without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Ask the wallet to sign an arbitrary payload with the given account.
    ///
    /// Fails with `WalletError::SignatureRejected` when the user declines.
    async fn sign_message(&self, address: &Address, payload: &[u8])
        -> Result<Vec<u8>, WalletError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Mock wallet provider for testing.
///
/// Signatures are `SHA-256(address || payload)`, which the in-memory auth
/// backend and FHE provider verify with the same scheme.
pub struct MockWalletProvider {
    /// Accounts the wallet exposes.
    accounts: Mutex<Vec<Address>>,
    /// Reject the next connection request?
    reject_connection: Mutex<bool>,
    /// Reject all signature requests?
    reject_signatures: Mutex<bool>,
    /// Number of signature requests served or rejected.
    signature_requests: Mutex<u64>,
}

impl MockWalletProvider {
    /// Create a mock wallet holding one account.
    #[must_use]
    pub fn with_account(address: Address) -> Self {
        Self {
            accounts: Mutex::new(vec![address]),
            reject_connection: Mutex::new(false),
            reject_signatures: Mutex::new(false),
            signature_requests: Mutex::new(0),
        }
    }

    /// Create a mock wallet with no accounts.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            reject_connection: Mutex::new(false),
            reject_signatures: Mutex::new(false),
            signature_requests: Mutex::new(0),
        }
    }

    /// Replace the exposed accounts.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock() = accounts;
    }

    /// Make the next `request_accounts` fail as user-rejected.
    pub fn set_reject_connection(&self, reject: bool) {
        *self.reject_connection.lock() = reject;
    }

    /// Make all signature requests fail as user-rejected.
    pub fn set_reject_signatures(&self, reject: bool) {
        *self.reject_signatures.lock() = reject;
    }

    /// Number of signature prompts shown so far.
    #[must_use]
    pub fn signature_requests(&self) -> u64 {
        *self.signature_requests.lock()
    }

    /// The deterministic mock signature for a payload.
    #[must_use]
    pub fn expected_signature(address: &Address, payload: &[u8]) -> Vec<u8> {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(address.as_str().as_bytes());
        hasher.update(payload);
        hasher.finalize().to_vec()
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if *self.reject_connection.lock() {
            return Err(WalletError::ConnectionRejected);
        }
        let accounts = self.accounts.lock().clone();
        if accounts.is_empty() {
            return Err(WalletError::NoAccounts);
        }
        Ok(accounts)
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.accounts.lock().clone())
    }

    async fn sign_message(
        &self,
        address: &Address,
        payload: &[u8],
    ) -> Result<Vec<u8>, WalletError> {
        *self.signature_requests.lock() += 1;
        if *self.reject_signatures.lock() {
            return Err(WalletError::SignatureRejected);
        }
        Ok(Self::expected_signature(address, payload))
    }
}
