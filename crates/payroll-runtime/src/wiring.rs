//! # Subsystem Wiring
//!
//! Builds the five subsystems over one shared event bus and connects the
//! seams: the wallet gateway signs login challenges and decrypt
//! authorizations, and the readiness coordinator gates the executor.

use crate::config::AppConfig;
use async_trait::async_trait;
use cp_01_wallet_gateway::{MockWalletProvider, WalletError, WalletGateway, WalletProvider};
use cp_02_identity_session::{
    challenge_message, AuthBackend, ChallengeSigner, InMemoryAuthBackend, SessionError,
    SessionService,
};
use cp_03_confidential_channel::{
    ChannelError, ChannelService, FheProvider, InMemoryFheProvider, WalletSigner,
};
use cp_04_readiness_coordinator::{ReadinessCoordinator, ReadinessSignal};
use cp_05_operation_executor::{
    InMemoryPayrollContract, OperationExecutor, PayrollContract, ReadinessGate,
};
use shared_bus::InMemoryEventBus;
use shared_types::Address;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Signs login challenges with the active wallet account.
pub struct GatewayChallengeSigner {
    gateway: Arc<WalletGateway>,
}

#[async_trait]
impl ChallengeSigner for GatewayChallengeSigner {
    async fn sign_challenge(
        &self,
        _address: &Address,
        nonce: &str,
    ) -> Result<Vec<u8>, SessionError> {
        self.gateway
            .sign(&challenge_message(nonce))
            .await
            .map_err(|e| match e {
                WalletError::SignatureRejected => SessionError::SignatureRejected,
                other => SessionError::Backend(other.to_string()),
            })
    }
}

/// Signs decrypt authorizations with the active wallet account.
pub struct GatewayWalletSigner {
    gateway: Arc<WalletGateway>,
}

#[async_trait]
impl WalletSigner for GatewayWalletSigner {
    fn signer_address(&self) -> Option<Address> {
        self.gateway.active_address()
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, ChannelError> {
        self.gateway.sign(payload).await.map_err(|e| match e {
            WalletError::SignatureRejected => ChannelError::AuthorizationDenied,
            other => ChannelError::Provider(other.to_string()),
        })
    }
}

/// Exposes the coordinator's gate to the executor.
pub struct CoordinatorGate {
    coordinator: Arc<ReadinessCoordinator>,
}

impl ReadinessGate for CoordinatorGate {
    fn is_ready(&self) -> bool {
        self.coordinator.is_ready()
    }
}

/// The wired payroll client core.
pub struct PayrollApp {
    /// Shared event bus.
    pub bus: Arc<InMemoryEventBus>,
    /// Subsystem 1: wallet gateway.
    pub gateway: Arc<WalletGateway>,
    /// Subsystem 2: identity session.
    pub session: Arc<SessionService>,
    /// Subsystem 3: confidential channel.
    pub channel: Arc<ChannelService>,
    /// Subsystem 4: readiness coordinator.
    pub coordinator: Arc<ReadinessCoordinator>,
    /// Subsystem 5: operation executor.
    pub executor: Arc<OperationExecutor>,
}

impl PayrollApp {
    /// Wire the subsystems over the given adapters.
    pub fn build(
        config: &AppConfig,
        provider: Arc<dyn WalletProvider>,
        backend: Arc<dyn AuthBackend>,
        fhe: Arc<dyn FheProvider>,
        contract: Arc<dyn PayrollContract>,
    ) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());

        let gateway = Arc::new(WalletGateway::new(provider, bus.clone()));
        let session = Arc::new(SessionService::new(backend, bus.clone()));
        let channel = Arc::new(ChannelService::new(
            fhe,
            Arc::new(GatewayWalletSigner {
                gateway: gateway.clone(),
            }),
            bus.clone(),
        ));

        let coordinator = Arc::new(ReadinessCoordinator::new(
            session.clone(),
            channel.clone(),
            Arc::new(GatewayChallengeSigner {
                gateway: gateway.clone(),
            }),
            config.contract_address.clone(),
            config.coordinator.clone(),
            bus.clone(),
        ));

        let executor = Arc::new(OperationExecutor::new(
            channel.clone(),
            contract,
            Arc::new(CoordinatorGate {
                coordinator: coordinator.clone(),
            }),
            bus.clone(),
        ));

        Self {
            bus,
            gateway,
            session,
            channel,
            coordinator,
            executor,
        }
    }

    /// Spawn the coordinator's event loop.
    pub fn start(&self) -> JoinHandle<()> {
        info!("Payroll client core starting");
        tokio::spawn(self.coordinator.clone().run())
    }

    /// Readiness signal for consumers (UI layers, tests).
    #[must_use]
    pub fn readiness(&self) -> watch::Receiver<ReadinessSignal> {
        self.coordinator.signal()
    }
}

/// A fully in-memory app plus handles to its mock adapters.
///
/// The only runnable configuration of this core: real deployments embed
/// the library crates behind host-provided adapters.
pub struct InMemoryApp {
    /// The wired app.
    pub app: PayrollApp,
    /// Mock browser wallet.
    pub provider: Arc<MockWalletProvider>,
    /// In-memory auth backend.
    pub backend: Arc<InMemoryAuthBackend>,
    /// In-memory FHE provider.
    pub fhe: Arc<InMemoryFheProvider>,
    /// In-memory payroll contract.
    pub contract: Arc<InMemoryPayrollContract>,
}

impl InMemoryApp {
    /// Build an app over fresh in-memory adapters.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let provider = Arc::new(MockWalletProvider::empty());
        let backend = Arc::new(InMemoryAuthBackend::new());
        let fhe = Arc::new(InMemoryFheProvider::new());
        let contract = Arc::new(InMemoryPayrollContract::new(fhe.clone()));

        let app = PayrollApp::build(
            config,
            provider.clone(),
            backend.clone(),
            fhe.clone(),
            contract.clone(),
        );

        Self {
            app,
            provider,
            backend,
            fhe,
            contract,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_02_identity_session::{NewAccount, Role};
    use cp_04_readiness_coordinator::ReadinessState;
    use std::time::Duration;
    use tokio::time::timeout;

    fn wallet() -> Address {
        Address::parse("0x0000000000000000000000000000000000000f11").unwrap()
    }

    fn contract_address() -> Address {
        Address::parse("0x0000000000000000000000000000000000000fcc").unwrap()
    }

    #[tokio::test]
    async fn test_wired_app_reaches_ready_and_moves_money() {
        let config = AppConfig::for_testing(contract_address());
        let rig = InMemoryApp::new(&config);
        rig.provider.set_accounts(vec![wallet()]);
        rig.backend.insert_account(NewAccount {
            full_name: "Ada".to_string(),
            role: Role::Company,
            wallet_address: wallet(),
        });
        let _loop = rig.app.start();

        rig.app.gateway.connect().await.unwrap();

        let mut signal = rig.app.readiness();
        timeout(Duration::from_secs(2), async {
            loop {
                if signal.borrow().state == ReadinessState::Ready {
                    return;
                }
                signal.changed().await.expect("coordinator stopped");
            }
        })
        .await
        .expect("never became ready");

        rig.app.executor.deposit(&wallet(), 5000).await.unwrap();
        assert_eq!(rig.app.executor.company_funds(&wallet()).await.unwrap(), 5000);
    }
}
