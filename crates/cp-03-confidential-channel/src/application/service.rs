//! # Channel Service
//!
//! Owns the per-contract channel state and drives the FHE provider.
//!
//! Initialization is split in two: `run_init` performs the provider work
//! without committing, and `commit_init` flips the channel to initialized.
//! The commit only lands while the attempt still owns the state, so an
//! init that completes after a disconnect's `invalidate` is discarded
//! rather than resurrecting the channel.

use crate::domain::{ChannelError, ChannelState, ConfidentialValue, SignedAuthorization};
use crate::ports::{FheProvider, WalletSigner};
use parking_lot::RwLock;
use shared_bus::{EventPublisher, InMemoryEventBus, PayrollEvent};
use shared_types::{Address, CiphertextHandle};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Channel service - single writer for the channel state.
pub struct ChannelService {
    /// External FHE capability.
    provider: Arc<dyn FheProvider>,
    /// Wallet signer for decrypt authorizations.
    signer: Arc<dyn WalletSigner>,
    /// Per-contract channel state, if any.
    state: RwLock<Option<ChannelState>>,
    /// Event bus for channel notifications.
    bus: Arc<InMemoryEventBus>,
}

impl ChannelService {
    /// Create a channel service.
    pub fn new(
        provider: Arc<dyn FheProvider>,
        signer: Arc<dyn WalletSigner>,
        bus: Arc<InMemoryEventBus>,
    ) -> Self {
        Self {
            provider,
            signer,
            state: RwLock::new(None),
            bus,
        }
    }

    /// Snapshot of the current channel state.
    #[must_use]
    pub fn state(&self) -> Option<ChannelState> {
        self.state.read().clone()
    }

    /// Whether encrypt/decrypt are currently permitted for `contract`.
    #[must_use]
    pub fn is_initialized_for(&self, contract: &Address) -> bool {
        self.state
            .read()
            .as_ref()
            .is_some_and(|s| s.initialized && s.contract_address == *contract)
    }

    /// Run provider initialization for a contract without committing.
    ///
    /// Idempotent for an already-initialized contract. A different contract
    /// address starts over from scratch. The caller decides whether to
    /// `commit_init` the result.
    pub async fn run_init(&self, contract: &Address) -> Result<(), ChannelError> {
        if self.is_initialized_for(contract) {
            debug!(contract = %contract, "Channel already initialized");
            return Ok(());
        }
        if self.signer.signer_address().is_none() {
            return Err(ChannelError::NoSigner);
        }

        *self.state.write() = Some(ChannelState::initializing(contract.clone()));
        debug!(contract = %contract, "Channel initialization started");

        if let Err(e) = self.provider.init_instance(contract).await {
            warn!(contract = %contract, error = %e, "Channel initialization failed");
            // Record the failure only if this attempt still owns the state;
            // an invalidate may have landed while the provider was busy.
            let mut state = self.state.write();
            if state
                .as_ref()
                .is_some_and(|s| s.initializing && s.contract_address == *contract)
            {
                *state = Some(ChannelState::failed(contract.clone(), e.to_string()));
            }
            return Err(e);
        }
        Ok(())
    }

    /// Commit a completed initialization and publish `ChannelInitialized`.
    ///
    /// Commits only while this attempt still owns the state: an
    /// `invalidate` that landed since `run_init` leaves the slot empty and
    /// the late commit is discarded. Returns whether the channel flipped
    /// to initialized.
    pub async fn commit_init(&self, contract: &Address) -> bool {
        let committed = {
            let mut state = self.state.write();
            let owns = state
                .as_ref()
                .is_some_and(|s| s.initializing && s.contract_address == *contract);
            if owns {
                *state = Some(ChannelState::initialized(contract.clone()));
            }
            owns
        };
        if committed {
            info!(contract = %contract, "Channel initialized");
            self.bus
                .publish(PayrollEvent::ChannelInitialized {
                    contract: contract.clone(),
                })
                .await;
        } else {
            debug!(contract = %contract, "Discarding channel commit, attempt no longer owns the state");
        }
        committed
    }

    /// Initialize and commit in one step.
    ///
    /// Convenience for callers outside the coordinator's interleaving
    /// concerns (tests, one-shot tools).
    pub async fn initialize(&self, contract: &Address) -> Result<(), ChannelError> {
        if self.is_initialized_for(contract) {
            return Ok(());
        }
        self.run_init(contract).await?;
        self.commit_init(contract).await;
        Ok(())
    }

    /// Encrypt a plaintext amount for the initialized contract.
    ///
    /// The result is single-use: the handle/proof pair is consumed by
    /// exactly one contract call.
    pub async fn encrypt(&self, value: u64) -> Result<ConfidentialValue, ChannelError> {
        let contract = self.ready_contract()?;
        let user = self.signer.signer_address().ok_or(ChannelError::NoSigner)?;
        self.provider.encrypt(&contract, &user, value).await
    }

    /// Decrypt an on-chain handle via a wallet-signed authorization.
    ///
    /// Issues exactly one signature request per call; the plaintext is
    /// returned to the caller and never stored or logged.
    pub async fn decrypt(&self, handle: &CiphertextHandle) -> Result<u64, ChannelError> {
        let contract = self.ready_contract()?;
        let signer = self.signer.signer_address().ok_or(ChannelError::NoSigner)?;

        let payload = self.provider.authorization_payload(handle, &contract);
        let signature = self.signer.sign(&payload).await?;
        let authorization = SignedAuthorization {
            signer,
            payload,
            signature,
        };

        self.provider
            .decrypt(handle, &contract, &authorization)
            .await
    }

    /// Tear the channel down and publish `ChannelInvalidated`.
    ///
    /// Called on wallet disconnect; subsequent encrypt/decrypt fail with
    /// `NotReady` until a fresh initialization.
    pub async fn invalidate(&self) {
        let had_state = self.state.write().take().is_some();
        if had_state {
            info!("Channel invalidated");
            self.bus.publish(PayrollEvent::ChannelInvalidated).await;
        }
    }

    fn ready_contract(&self) -> Result<Address, ChannelError> {
        self.state
            .read()
            .as_ref()
            .filter(|s| s.initialized)
            .map(|s| s.contract_address.clone())
            .ok_or(ChannelError::NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::InMemoryFheProvider;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use shared_bus::EventFilter;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn test_contract() -> Address {
        Address::parse("0x0000000000000000000000000000000000000c10").unwrap()
    }

    fn other_contract() -> Address {
        Address::parse("0x0000000000000000000000000000000000000c11").unwrap()
    }

    fn test_user() -> Address {
        Address::parse("0x0000000000000000000000000000000000000c12").unwrap()
    }

    /// Signs authorizations exactly like the mock wallet provider would.
    struct TestSigner {
        address: Option<Address>,
        reject: bool,
        sign_calls: AtomicU64,
    }

    impl TestSigner {
        fn connected() -> Self {
            Self {
                address: Some(test_user()),
                reject: false,
                sign_calls: AtomicU64::new(0),
            }
        }

        fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::connected()
            }
        }

        fn disconnected() -> Self {
            Self {
                address: None,
                reject: false,
                sign_calls: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl WalletSigner for TestSigner {
        fn signer_address(&self) -> Option<Address> {
            self.address.clone()
        }

        async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, ChannelError> {
            self.sign_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(ChannelError::AuthorizationDenied);
            }
            let address = self.address.as_ref().ok_or(ChannelError::NoSigner)?;
            use sha2::{Digest, Sha256};
            let mut hasher = Sha256::new();
            hasher.update(address.as_str().as_bytes());
            hasher.update(payload);
            Ok(hasher.finalize().to_vec())
        }
    }

    fn create_service(
        signer: TestSigner,
    ) -> (ChannelService, Arc<InMemoryFheProvider>, Arc<InMemoryEventBus>) {
        let provider = Arc::new(InMemoryFheProvider::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let service = ChannelService::new(provider.clone(), Arc::new(signer), bus.clone());
        (service, provider, bus)
    }

    #[tokio::test]
    async fn test_initialize_publishes_event() {
        let (service, _provider, bus) = create_service(TestSigner::connected());
        let mut sub = bus.subscribe(EventFilter::all());

        service.initialize(&test_contract()).await.unwrap();

        assert!(service.is_initialized_for(&test_contract()));
        let event = sub.recv().await.unwrap();
        assert!(matches!(event, PayrollEvent::ChannelInitialized { .. }));
    }

    #[tokio::test]
    async fn test_reinit_same_contract_is_noop() {
        let (service, _provider, bus) = create_service(TestSigner::connected());
        service.initialize(&test_contract()).await.unwrap();
        let before = bus.events_published();

        service.initialize(&test_contract()).await.unwrap();
        assert_eq!(bus.events_published(), before);
    }

    #[tokio::test]
    async fn test_init_different_contract_starts_over() {
        let (service, provider, _bus) = create_service(TestSigner::connected());
        service.initialize(&test_contract()).await.unwrap();

        service.initialize(&other_contract()).await.unwrap();
        assert!(service.is_initialized_for(&other_contract()));
        assert!(!service.is_initialized_for(&test_contract()));
        assert!(provider.has_instance(&other_contract()));
    }

    #[tokio::test]
    async fn test_init_without_signer() {
        let (service, _provider, _bus) = create_service(TestSigner::disconnected());
        let result = service.run_init(&test_contract()).await;
        assert!(matches!(result, Err(ChannelError::NoSigner)));
        assert!(service.state().is_none());
    }

    #[tokio::test]
    async fn test_init_failure_records_error() {
        let (service, provider, _bus) = create_service(TestSigner::connected());
        provider.set_fail_init(true);

        let result = service.run_init(&test_contract()).await;
        assert!(matches!(result, Err(ChannelError::InitFailed(_))));
        let state = service.state().unwrap();
        assert!(!state.initialized);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn test_run_init_does_not_commit() {
        let (service, _provider, _bus) = create_service(TestSigner::connected());
        service.run_init(&test_contract()).await.unwrap();

        // Still initializing until commit_init
        assert!(!service.is_initialized_for(&test_contract()));
        assert!(service.state().unwrap().initializing);
    }

    #[tokio::test]
    async fn test_commit_after_invalidate_is_discarded() {
        let (service, _provider, bus) = create_service(TestSigner::connected());
        service.run_init(&test_contract()).await.unwrap();

        // Disconnect teardown completes before the init result commits
        service.invalidate().await;
        let before = bus.events_published();

        assert!(!service.commit_init(&test_contract()).await);
        assert!(!service.is_initialized_for(&test_contract()));
        assert!(service.state().is_none());
        assert_eq!(bus.events_published(), before);
    }

    #[tokio::test]
    async fn test_commit_while_owning_the_state_lands() {
        let (service, _provider, _bus) = create_service(TestSigner::connected());
        service.run_init(&test_contract()).await.unwrap();

        assert!(service.commit_init(&test_contract()).await);
        assert!(service.is_initialized_for(&test_contract()));
    }

    #[tokio::test]
    async fn test_encrypt_before_init() {
        let (service, _provider, _bus) = create_service(TestSigner::connected());
        let result = service.encrypt(100).await;
        assert!(matches!(result, Err(ChannelError::NotReady)));
    }

    #[tokio::test]
    async fn test_decrypt_issues_exactly_one_signature_request() {
        let signer = Arc::new(TestSigner::connected());
        let provider = Arc::new(InMemoryFheProvider::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let service = ChannelService::new(provider.clone(), signer.clone(), bus);

        service.initialize(&test_contract()).await.unwrap();
        let handle = provider.mint_handle(5000);

        let plain = service.decrypt(&handle).await.unwrap();
        assert_eq!(plain, 5000);
        assert_eq!(signer.sign_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_decrypt_rejection_is_final() {
        let signer = Arc::new(TestSigner::rejecting());
        let provider = Arc::new(InMemoryFheProvider::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let service = ChannelService::new(provider.clone(), signer.clone(), bus);

        service.initialize(&test_contract()).await.unwrap();
        let handle = provider.mint_handle(7);

        let result = service.decrypt(&handle).await;
        assert!(matches!(result, Err(ChannelError::AuthorizationDenied)));
        // No automatic retry
        assert_eq!(signer.sign_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.decrypt_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_publishes_and_blocks() {
        let (service, _provider, bus) = create_service(TestSigner::connected());
        service.initialize(&test_contract()).await.unwrap();

        let mut sub = bus.subscribe(EventFilter::all());
        service.invalidate().await;

        let event = sub.recv().await.unwrap();
        assert!(matches!(event, PayrollEvent::ChannelInvalidated));
        assert!(matches!(
            service.encrypt(1).await,
            Err(ChannelError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_invalidate_without_channel_is_silent() {
        let (service, _provider, bus) = create_service(TestSigner::connected());
        service.invalidate().await;
        assert_eq!(bus.events_published(), 0);
    }

    proptest! {
        #[test]
        fn prop_encrypt_decrypt_round_trip(value in 0u64..=9_007_199_254_740_991) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            rt.block_on(async {
                let provider = Arc::new(InMemoryFheProvider::new());
                let bus = Arc::new(InMemoryEventBus::new());
                let service = ChannelService::new(
                    provider.clone(),
                    Arc::new(TestSigner::connected()),
                    bus,
                );
                service.initialize(&test_contract()).await.unwrap();

                let encrypted = service.encrypt(value).await.unwrap();
                let (handle, _proof) = encrypted.into_parts();
                let plain = service.decrypt(&handle).await.unwrap();
                prop_assert_eq!(plain, value);
                Ok(())
            })?;
        }
    }
}
