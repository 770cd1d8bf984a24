//! # Outbound Ports
//!
//! Traits for the backend auth API and the wallet challenge signer.
//!
//! The backend surface mirrors `POST /register`, `POST /signin`,
//! `POST /signout`, `GET /me`, and `PUT /profile`; request and response
//! bodies carry plaintext profile fields only, never amounts.

use crate::domain::{Role, SessionError};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::HashMap;
use uuid::Uuid;

/// Session payload returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDto {
    /// Backend user identifier.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Wallet address the account is keyed by.
    pub wallet_address: Address,
}

/// A login challenge issued for one wallet address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginChallenge {
    /// Single-use nonce to be signed by the wallet.
    pub nonce: String,
}

/// Registration request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Wallet address to key the account by.
    pub wallet_address: Address,
}

/// Profile update request body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name, if changing.
    pub full_name: Option<String>,
}

/// The payload a wallet signs to answer a login challenge.
///
/// Backend and client must agree on this byte layout exactly.
#[must_use]
pub fn challenge_message(nonce: &str) -> Vec<u8> {
    format!("cipher-payroll login: {nonce}").into_bytes()
}

/// Backend auth/session API - outbound port.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /register` - create an account keyed by a wallet address.
    async fn register(&self, account: NewAccount) -> Result<SessionDto, SessionError>;

    /// Issue a login challenge for a wallet address.
    async fn challenge(&self, address: &Address) -> Result<LoginChallenge, SessionError>;

    /// `POST /signin` - exchange a signed challenge for a session.
    async fn sign_in(
        &self,
        address: &Address,
        nonce: &str,
        signature: &[u8],
    ) -> Result<SessionDto, SessionError>;

    /// `POST /signout` - destroy the backend session.
    async fn sign_out(&self) -> Result<(), SessionError>;

    /// `GET /me` - fetch the current session, if any.
    async fn me(&self) -> Result<Option<SessionDto>, SessionError>;

    /// `PUT /profile` - update profile fields.
    async fn update_profile(&self, update: ProfileUpdate) -> Result<SessionDto, SessionError>;
}

/// Signs login challenges with the active wallet - outbound port.
///
/// Implemented over the wallet gateway at wiring time.
#[async_trait]
pub trait ChallengeSigner: Send + Sync {
    /// Sign the challenge message for the given address.
    ///
    /// Fails with `SessionError::SignatureRejected` when the user declines.
    async fn sign_challenge(
        &self,
        address: &Address,
        nonce: &str,
    ) -> Result<Vec<u8>, SessionError>;
}

// =============================================================================
// In-Memory Adapter for Testing
// =============================================================================

/// In-memory auth backend.
///
/// Verifies challenge signatures with the same `SHA-256(address || message)`
/// scheme the mock wallet provider uses to produce them.
pub struct InMemoryAuthBackend {
    /// Registered accounts by wallet address.
    accounts: RwLock<HashMap<Address, SessionDto>>,
    /// Outstanding challenge nonce per address.
    nonces: RwLock<HashMap<Address, String>>,
    /// Address of the live session (cookie stand-in).
    active: RwLock<Option<Address>>,
    /// Monotonic counter for nonce generation.
    nonce_counter: RwLock<u64>,
    /// Fail the next sign-in with a backend error?
    fail_sign_in: RwLock<bool>,
}

impl InMemoryAuthBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            nonces: RwLock::new(HashMap::new()),
            active: RwLock::new(None),
            nonce_counter: RwLock::new(0),
            fail_sign_in: RwLock::new(false),
        }
    }

    /// Create a backend with one registered account.
    #[must_use]
    pub fn with_account(account: NewAccount) -> Self {
        let backend = Self::new();
        backend.insert_account(account);
        backend
    }

    /// Register an account directly, bypassing the API.
    pub fn insert_account(&self, account: NewAccount) {
        let dto = SessionDto {
            user_id: Uuid::new_v4(),
            full_name: account.full_name,
            role: account.role,
            wallet_address: account.wallet_address.clone(),
        };
        self.accounts.write().insert(account.wallet_address, dto);
    }

    /// Make the next sign-in fail with a backend error.
    pub fn set_fail_sign_in(&self, fail: bool) {
        *self.fail_sign_in.write() = fail;
    }

    fn expected_signature(address: &Address, nonce: &str) -> Vec<u8> {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(address.as_str().as_bytes());
        hasher.update(challenge_message(nonce));
        hasher.finalize().to_vec()
    }
}

impl Default for InMemoryAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for InMemoryAuthBackend {
    async fn register(&self, account: NewAccount) -> Result<SessionDto, SessionError> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&account.wallet_address) {
            return Err(SessionError::AlreadyRegistered(
                account.wallet_address.to_string(),
            ));
        }
        let dto = SessionDto {
            user_id: Uuid::new_v4(),
            full_name: account.full_name,
            role: account.role,
            wallet_address: account.wallet_address.clone(),
        };
        accounts.insert(account.wallet_address.clone(), dto.clone());
        drop(accounts);

        *self.active.write() = Some(account.wallet_address);
        Ok(dto)
    }

    async fn challenge(&self, address: &Address) -> Result<LoginChallenge, SessionError> {
        if !self.accounts.read().contains_key(address) {
            return Err(SessionError::UnknownWallet(address.to_string()));
        }
        let nonce = {
            let mut counter = self.nonce_counter.write();
            *counter += 1;
            format!("nonce-{}", *counter)
        };
        self.nonces.write().insert(address.clone(), nonce.clone());
        Ok(LoginChallenge { nonce })
    }

    async fn sign_in(
        &self,
        address: &Address,
        nonce: &str,
        signature: &[u8],
    ) -> Result<SessionDto, SessionError> {
        if *self.fail_sign_in.read() {
            return Err(SessionError::Backend("simulated backend failure".to_string()));
        }

        // Nonce is single-use
        let issued = self.nonces.write().remove(address);
        if issued.as_deref() != Some(nonce) {
            return Err(SessionError::VerificationFailed);
        }

        if signature != Self::expected_signature(address, nonce) {
            return Err(SessionError::VerificationFailed);
        }

        let dto = self
            .accounts
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| SessionError::UnknownWallet(address.to_string()))?;

        *self.active.write() = Some(address.clone());
        Ok(dto)
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        *self.active.write() = None;
        Ok(())
    }

    async fn me(&self) -> Result<Option<SessionDto>, SessionError> {
        let active = self.active.read().clone();
        Ok(active.and_then(|address| self.accounts.read().get(&address).cloned()))
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<SessionDto, SessionError> {
        let active = self
            .active
            .read()
            .clone()
            .ok_or(SessionError::NotAuthenticated)?;

        let mut accounts = self.accounts.write();
        let dto = accounts
            .get_mut(&active)
            .ok_or(SessionError::NotAuthenticated)?;
        if let Some(full_name) = update.full_name {
            dto.full_name = full_name;
        }
        Ok(dto.clone())
    }
}
