//! # Domain Entities
//!
//! Wallet connection state.

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Connection state of the browser wallet.
///
/// Produced by the wallet gateway; read-only to the rest of the system.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    /// Active account address, if any.
    pub address: Option<Address>,
    /// Whether a wallet is connected.
    pub connected: bool,
    /// Whether a connection attempt is in progress.
    pub connecting: bool,
}

impl WalletState {
    /// State with no wallet.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// State while a connection request is pending.
    #[must_use]
    pub fn connecting() -> Self {
        Self {
            address: None,
            connected: false,
            connecting: true,
        }
    }

    /// State with an active account.
    #[must_use]
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            connected: true,
            connecting: false,
        }
    }

    /// Whether the wallet can currently sign.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.connected && self.address.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address() -> Address {
        Address::parse("0x0000000000000000000000000000000000000a01").unwrap()
    }

    #[test]
    fn test_disconnected_state() {
        let state = WalletState::disconnected();
        assert!(!state.connected);
        assert!(!state.is_usable());
        assert!(state.address.is_none());
    }

    #[test]
    fn test_connecting_state() {
        let state = WalletState::connecting();
        assert!(state.connecting);
        assert!(!state.is_usable());
    }

    #[test]
    fn test_connected_state_is_usable() {
        let state = WalletState::connected(test_address());
        assert!(state.is_usable());
        assert_eq!(state.address, Some(test_address()));
    }
}
