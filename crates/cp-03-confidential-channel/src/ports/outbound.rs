//! # Outbound Ports
//!
//! Traits for the external FHE service and the wallet signer.

use crate::domain::{ChannelError, ConfidentialValue, SignedAuthorization};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Address, CiphertextHandle, ZkProof};
use std::collections::HashMap;
use std::time::Duration;

/// External FHE capability - outbound port.
///
/// All operations are scoped to a contract address; the provider holds no
/// authority of its own and never sees a wallet key.
#[async_trait]
pub trait FheProvider: Send + Sync {
    /// Prepare the provider for a contract (fetch keys, build instance).
    async fn init_instance(&self, contract: &Address) -> Result<(), ChannelError>;

    /// Encrypt a value for `(contract, user)`.
    async fn encrypt(
        &self,
        contract: &Address,
        user: &Address,
        value: u64,
    ) -> Result<ConfidentialValue, ChannelError>;

    /// The payload a wallet must sign to authorize decrypting `handle`.
    fn authorization_payload(&self, handle: &CiphertextHandle, contract: &Address) -> Vec<u8>;

    /// Decrypt a handle given a wallet-signed authorization.
    async fn decrypt(
        &self,
        handle: &CiphertextHandle,
        contract: &Address,
        authorization: &SignedAuthorization,
    ) -> Result<u64, ChannelError>;
}

/// Signs decrypt authorizations with the active wallet - outbound port.
///
/// Implemented over the wallet gateway at wiring time. A user rejection
/// surfaces as `ChannelError::AuthorizationDenied`.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// The address signatures will be produced for.
    fn signer_address(&self) -> Option<Address>;

    /// Ask the wallet to sign an authorization payload.
    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, ChannelError>;
}

// =============================================================================
// In-Memory Adapter for Testing
// =============================================================================

/// In-memory FHE provider.
///
/// Handles resolve through a private table, proofs are digests over the
/// handle scope, and authorization signatures are verified with the same
/// `SHA-256(signer || payload)` scheme the mock wallet produces. The
/// round-trip law holds for every `u64`.
pub struct InMemoryFheProvider {
    /// Plaintext table, keyed by handle. Never exposed.
    values: RwLock<HashMap<CiphertextHandle, u64>>,
    /// Contracts an instance was initialized for.
    instances: RwLock<Vec<Address>>,
    /// Monotonic handle counter.
    counter: RwLock<u64>,
    /// Fail the next `init_instance`?
    fail_init: RwLock<bool>,
    /// Artificial delay for `init_instance`, for interleaving tests.
    init_delay: RwLock<Option<Duration>>,
    /// Number of decrypt calls served.
    decrypt_calls: RwLock<u64>,
}

impl InMemoryFheProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            instances: RwLock::new(Vec::new()),
            counter: RwLock::new(0),
            fail_init: RwLock::new(false),
            init_delay: RwLock::new(None),
            decrypt_calls: RwLock::new(0),
        }
    }

    /// Make the next `init_instance` fail.
    pub fn set_fail_init(&self, fail: bool) {
        *self.fail_init.write() = fail;
    }

    /// Delay `init_instance` to widen interleaving windows in tests.
    pub fn set_init_delay(&self, delay: Option<Duration>) {
        *self.init_delay.write() = delay;
    }

    /// Number of decrypt calls served so far.
    #[must_use]
    pub fn decrypt_calls(&self) -> u64 {
        *self.decrypt_calls.read()
    }

    /// Whether an instance exists for the contract.
    #[must_use]
    pub fn has_instance(&self, contract: &Address) -> bool {
        self.instances.read().contains(contract)
    }

    /// Mint a handle for a plaintext value without a proof.
    ///
    /// Models ciphertexts that already live on-chain (e.g. an initial zero
    /// balance); used by the in-memory contract adapter.
    #[must_use]
    pub fn mint_handle(&self, value: u64) -> CiphertextHandle {
        let handle = self.next_handle();
        self.values.write().insert(handle.clone(), value);
        handle
    }

    /// Homomorphic addition: a fresh handle holding `a + b`.
    ///
    /// Models the contract-side FHE add; saturates at the type bound like
    /// the on-chain euint arithmetic.
    pub fn add_handles(
        &self,
        a: &CiphertextHandle,
        b: &CiphertextHandle,
    ) -> Result<CiphertextHandle, ChannelError> {
        let values = self.values.read();
        let left = *values
            .get(a)
            .ok_or_else(|| ChannelError::Provider(format!("unknown handle: {a}")))?;
        let right = *values
            .get(b)
            .ok_or_else(|| ChannelError::Provider(format!("unknown handle: {b}")))?;
        drop(values);

        Ok(self.mint_handle(left.saturating_add(right)))
    }

    /// Homomorphic subtraction: a fresh handle holding `a - b` (floor 0).
    pub fn sub_handles(
        &self,
        a: &CiphertextHandle,
        b: &CiphertextHandle,
    ) -> Result<CiphertextHandle, ChannelError> {
        let values = self.values.read();
        let left = *values
            .get(a)
            .ok_or_else(|| ChannelError::Provider(format!("unknown handle: {a}")))?;
        let right = *values
            .get(b)
            .ok_or_else(|| ChannelError::Provider(format!("unknown handle: {b}")))?;
        drop(values);

        Ok(self.mint_handle(left.saturating_sub(right)))
    }

    fn next_handle(&self) -> CiphertextHandle {
        let mut counter = self.counter.write();
        *counter += 1;
        CiphertextHandle::new(format!("ct-{:04}", *counter))
    }

    fn expected_signature(signer: &Address, payload: &[u8]) -> Vec<u8> {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(signer.as_str().as_bytes());
        hasher.update(payload);
        hasher.finalize().to_vec()
    }
}

impl Default for InMemoryFheProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FheProvider for InMemoryFheProvider {
    async fn init_instance(&self, contract: &Address) -> Result<(), ChannelError> {
        let delay = *self.init_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_init.read() {
            return Err(ChannelError::InitFailed(
                "simulated key fetch failure".to_string(),
            ));
        }

        let mut instances = self.instances.write();
        if !instances.contains(contract) {
            instances.push(contract.clone());
        }
        Ok(())
    }

    async fn encrypt(
        &self,
        contract: &Address,
        user: &Address,
        value: u64,
    ) -> Result<ConfidentialValue, ChannelError> {
        if !self.has_instance(contract) {
            return Err(ChannelError::Provider(format!(
                "no instance for contract {contract}"
            )));
        }

        let handle = self.mint_handle(value);

        // Proof binds the handle to its (contract, user) scope.
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(handle.as_str().as_bytes());
        hasher.update(contract.as_str().as_bytes());
        hasher.update(user.as_str().as_bytes());
        let proof = ZkProof::new(hasher.finalize().to_vec());

        Ok(ConfidentialValue::new(handle, proof))
    }

    fn authorization_payload(&self, handle: &CiphertextHandle, contract: &Address) -> Vec<u8> {
        format!("decrypt {handle} for {contract}").into_bytes()
    }

    async fn decrypt(
        &self,
        handle: &CiphertextHandle,
        contract: &Address,
        authorization: &SignedAuthorization,
    ) -> Result<u64, ChannelError> {
        *self.decrypt_calls.write() += 1;

        if authorization.payload != self.authorization_payload(handle, contract) {
            return Err(ChannelError::Provider(
                "authorization scoped to a different handle".to_string(),
            ));
        }
        if authorization.signature
            != Self::expected_signature(&authorization.signer, &authorization.payload)
        {
            return Err(ChannelError::Provider(
                "authorization signature invalid".to_string(),
            ));
        }

        self.values
            .read()
            .get(handle)
            .copied()
            .ok_or_else(|| ChannelError::Provider(format!("unknown handle: {handle}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_contract() -> Address {
        Address::parse("0x0000000000000000000000000000000000000c02").unwrap()
    }

    fn test_user() -> Address {
        Address::parse("0x0000000000000000000000000000000000000c03").unwrap()
    }

    fn authorize(
        provider: &InMemoryFheProvider,
        handle: &CiphertextHandle,
        signer: &Address,
    ) -> SignedAuthorization {
        let payload = provider.authorization_payload(handle, &test_contract());
        let signature = InMemoryFheProvider::expected_signature(signer, &payload);
        SignedAuthorization {
            signer: signer.clone(),
            payload,
            signature,
        }
    }

    #[tokio::test]
    async fn test_encrypt_requires_instance() {
        let provider = InMemoryFheProvider::new();
        let result = provider.encrypt(&test_contract(), &test_user(), 5).await;
        assert!(matches!(result, Err(ChannelError::Provider(_))));
    }

    #[tokio::test]
    async fn test_encrypt_decrypt_round_trip() {
        let provider = InMemoryFheProvider::new();
        provider.init_instance(&test_contract()).await.unwrap();

        let value = provider
            .encrypt(&test_contract(), &test_user(), 5000)
            .await
            .unwrap();
        let (handle, _proof) = value.into_parts();

        let auth = authorize(&provider, &handle, &test_user());
        let plain = provider
            .decrypt(&handle, &test_contract(), &auth)
            .await
            .unwrap();
        assert_eq!(plain, 5000);
    }

    #[tokio::test]
    async fn test_decrypt_rejects_bad_signature() {
        let provider = InMemoryFheProvider::new();
        provider.init_instance(&test_contract()).await.unwrap();

        let value = provider
            .encrypt(&test_contract(), &test_user(), 7)
            .await
            .unwrap();
        let (handle, _proof) = value.into_parts();

        let mut auth = authorize(&provider, &handle, &test_user());
        auth.signature = vec![0u8; 32];
        let result = provider.decrypt(&handle, &test_contract(), &auth).await;
        assert!(matches!(result, Err(ChannelError::Provider(_))));
    }

    #[tokio::test]
    async fn test_init_failure() {
        let provider = InMemoryFheProvider::new();
        provider.set_fail_init(true);
        let result = provider.init_instance(&test_contract()).await;
        assert!(matches!(result, Err(ChannelError::InitFailed(_))));
        assert!(!provider.has_instance(&test_contract()));
    }

    #[tokio::test]
    async fn test_add_handles() {
        let provider = InMemoryFheProvider::new();
        let a = provider.mint_handle(30);
        let b = provider.mint_handle(12);
        let sum = provider.add_handles(&a, &b).unwrap();

        let auth = authorize(&provider, &sum, &test_user());
        let plain = provider
            .decrypt(&sum, &test_contract(), &auth)
            .await
            .unwrap();
        assert_eq!(plain, 42);
    }

    #[tokio::test]
    async fn test_sub_handles_floors_at_zero() {
        let provider = InMemoryFheProvider::new();
        let a = provider.mint_handle(5);
        let b = provider.mint_handle(9);
        let diff = provider.sub_handles(&a, &b).unwrap();

        let auth = authorize(&provider, &diff, &test_user());
        let plain = provider
            .decrypt(&diff, &test_contract(), &auth)
            .await
            .unwrap();
        assert_eq!(plain, 0);
    }

    #[tokio::test]
    async fn test_fresh_handle_per_encrypt() {
        let provider = InMemoryFheProvider::new();
        provider.init_instance(&test_contract()).await.unwrap();

        let first = provider
            .encrypt(&test_contract(), &test_user(), 1)
            .await
            .unwrap();
        let second = provider
            .encrypt(&test_contract(), &test_user(), 1)
            .await
            .unwrap();
        assert_ne!(first.handle(), second.handle());
    }
}
