//! # Wallet Gateway Service
//!
//! Owns `WalletState` and translates provider callbacks into bus events.

use crate::domain::{WalletError, WalletState};
use crate::ports::WalletProvider;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, InMemoryEventBus, PayrollEvent};
use shared_types::Address;
use std::sync::Arc;
use tracing::{info, warn};

/// Wallet gateway - tracks the active wallet and publishes wallet events.
pub struct WalletGateway {
    /// The selected provider.
    provider: Arc<dyn WalletProvider>,
    /// Current connection state. Single writer: this gateway.
    state: RwLock<WalletState>,
    /// Event bus for wallet notifications.
    bus: Arc<InMemoryEventBus>,
}

impl WalletGateway {
    /// Create a gateway over a detected provider.
    pub fn new(provider: Arc<dyn WalletProvider>, bus: Arc<InMemoryEventBus>) -> Self {
        Self {
            provider,
            state: RwLock::new(WalletState::disconnected()),
            bus,
        }
    }

    /// Snapshot of the current wallet state.
    #[must_use]
    pub fn state(&self) -> WalletState {
        self.state.read().clone()
    }

    /// Active address, if connected.
    #[must_use]
    pub fn active_address(&self) -> Option<Address> {
        self.state.read().address.clone()
    }

    /// Connect the wallet: prompt for accounts and adopt the first one.
    ///
    /// Publishes `WalletConnected` on success. A second call while already
    /// connected re-publishes nothing and returns the active address.
    pub async fn connect(&self) -> Result<Address, WalletError> {
        if let Some(address) = self.active_address() {
            return Ok(address);
        }

        *self.state.write() = WalletState::connecting();

        let accounts = match self.provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                *self.state.write() = WalletState::disconnected();
                warn!(provider = self.provider.provider_name(), error = %e, "Wallet connect failed");
                return Err(e);
            }
        };

        let Some(address) = accounts.into_iter().next() else {
            *self.state.write() = WalletState::disconnected();
            return Err(WalletError::NoAccounts);
        };

        *self.state.write() = WalletState::connected(address.clone());
        info!(provider = self.provider.provider_name(), address = %address, "Wallet connected");

        self.bus
            .publish(PayrollEvent::WalletConnected {
                address: address.clone(),
            })
            .await;

        Ok(address)
    }

    /// Disconnect the wallet and publish `WalletDisconnected`.
    pub async fn disconnect(&self) {
        let was_connected = {
            let mut state = self.state.write();
            let was = state.connected;
            *state = WalletState::disconnected();
            was
        };

        if was_connected {
            info!("Wallet disconnected");
            self.bus.publish(PayrollEvent::WalletDisconnected).await;
        }
    }

    /// Host callback: the provider's account list changed.
    ///
    /// An empty list is a disconnect; a new first account is an account
    /// switch. The same account again is a no-op.
    pub async fn handle_accounts_changed(&self, accounts: Vec<Address>) {
        let Some(address) = accounts.into_iter().next() else {
            self.disconnect().await;
            return;
        };

        let changed = {
            let mut state = self.state.write();
            if state.address.as_ref() == Some(&address) {
                false
            } else {
                *state = WalletState::connected(address.clone());
                true
            }
        };

        if changed {
            info!(address = %address, "Wallet account changed");
            self.bus
                .publish(PayrollEvent::WalletAccountChanged { address })
                .await;
        }
    }

    /// Ask the wallet to sign a payload with the active account.
    pub async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, WalletError> {
        let Some(address) = self.active_address() else {
            return Err(WalletError::NoAccounts);
        };
        self.provider.sign_message(&address, payload).await
    }
}
