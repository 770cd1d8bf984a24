//! # Session Service
//!
//! Owns the `Session` singleton and talks to the auth backend.
//!
//! `authenticate` performs the network exchange without touching state;
//! `adopt_if_fresh` commits a session only if no teardown landed since the
//! attempt started, with the check and the write under one lock. The split
//! lets a sign-in that resolves after a disconnect be discarded instead of
//! resurrecting a session.

use crate::domain::{Profile, Session, SessionError};
use crate::ports::{AuthBackend, ChallengeSigner, NewAccount, ProfileUpdate, SessionDto};
use parking_lot::RwLock;
use shared_bus::{EventPublisher, InMemoryEventBus, PayrollEvent};
use shared_types::Address;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Session service - single writer for the session singleton.
pub struct SessionService {
    /// Backend auth API.
    backend: Arc<dyn AuthBackend>,
    /// Current session, if any.
    session: RwLock<Option<Session>>,
    /// Teardown counter. Bumped under the session write lock so
    /// `adopt_if_fresh` can check-and-commit atomically against it.
    generation: AtomicU64,
    /// Event bus for session notifications.
    bus: Arc<InMemoryEventBus>,
}

impl SessionService {
    /// Create a session service.
    pub fn new(backend: Arc<dyn AuthBackend>, bus: Arc<InMemoryEventBus>) -> Self {
        Self {
            backend,
            session: RwLock::new(None),
            generation: AtomicU64::new(0),
            bus,
        }
    }

    /// Teardown counter observed by `adopt_if_fresh`.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// Whether a live session exists for the given wallet address.
    #[must_use]
    pub fn is_authenticated_for(&self, address: &Address) -> bool {
        self.session
            .read()
            .as_ref()
            .is_some_and(|s| s.matches_address(address))
    }

    /// Run the challenge/sign exchange for a wallet address.
    ///
    /// Pure with respect to session state: the caller decides whether to
    /// `adopt` the result.
    pub async fn authenticate(
        &self,
        address: &Address,
        signer: &dyn ChallengeSigner,
    ) -> Result<Session, SessionError> {
        let challenge = self.backend.challenge(address).await?;
        let signature = signer.sign_challenge(address, &challenge.nonce).await?;
        let dto = self
            .backend
            .sign_in(address, &challenge.nonce, &signature)
            .await?;
        Ok(Self::session_from_dto(dto))
    }

    /// Commit a session and publish `SessionEstablished`.
    pub async fn adopt(&self, session: Session) {
        let address = session.profile.wallet_address.clone();
        *self.session.write() = Some(session);
        info!(address = %address, "Session established");
        self.bus
            .publish(PayrollEvent::SessionEstablished { address })
            .await;
    }

    /// Commit a session unless a teardown landed since `generation` was
    /// captured. Returns whether the session was adopted.
    ///
    /// The generation check and the session write happen under one lock:
    /// a concurrent `force_clear` either runs first and the commit is
    /// rejected, or runs after and clears the adopted session again.
    pub async fn adopt_if_fresh(&self, session: Session, generation: u64) -> bool {
        let address = session.profile.wallet_address.clone();
        {
            let mut slot = self.session.write();
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!(address = %address, "Discarding session commit after a teardown");
                return false;
            }
            *slot = Some(session);
        }
        info!(address = %address, "Session established");
        self.bus
            .publish(PayrollEvent::SessionEstablished { address })
            .await;
        true
    }

    /// Register a new account and adopt the resulting session.
    pub async fn register(&self, account: NewAccount) -> Result<Session, SessionError> {
        let dto = self.backend.register(account).await?;
        let session = Self::session_from_dto(dto);
        self.adopt(session.clone()).await;
        Ok(session)
    }

    /// Explicit sign-out: backend first, then local teardown.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.backend.sign_out().await?;
        self.clear_local().await;
        Ok(())
    }

    /// Unconditional teardown used on wallet disconnect.
    ///
    /// The backend sign-out is best-effort; local state is cleared
    /// regardless so the disconnect invariant holds even when the network
    /// is gone.
    pub async fn force_clear(&self) {
        if let Err(e) = self.backend.sign_out().await {
            warn!(error = %e, "Backend sign-out failed during teardown");
        }
        self.clear_local().await;
    }

    /// Re-fetch the session from the backend (`GET /me`).
    pub async fn refresh(&self) -> Result<Option<Session>, SessionError> {
        let session = self.backend.me().await?.map(Self::session_from_dto);
        *self.session.write() = session.clone();
        Ok(session)
    }

    /// Update profile fields on the backend and locally.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Session, SessionError> {
        if self.session.read().is_none() {
            return Err(SessionError::NotAuthenticated);
        }
        let dto = self.backend.update_profile(update).await?;
        let session = Self::session_from_dto(dto);
        *self.session.write() = Some(session.clone());
        Ok(session)
    }

    async fn clear_local(&self) {
        let had_session = {
            let mut slot = self.session.write();
            // Invalidates any sign-in still in flight, atomically with the
            // clear. Bumped even when no session was held: a teardown must
            // also defeat an attempt that has not committed yet.
            self.generation.fetch_add(1, Ordering::SeqCst);
            slot.take().is_some()
        };
        if had_session {
            info!("Session cleared");
            self.bus.publish(PayrollEvent::SessionCleared).await;
        }
    }

    fn session_from_dto(dto: SessionDto) -> Session {
        Session {
            user_id: dto.user_id,
            profile: Profile {
                full_name: dto.full_name,
                role: dto.role,
                wallet_address: dto.wallet_address,
            },
            authenticated: true,
        }
    }
}
