//! # Readiness Coordinator
//!
//! Single writer for the readiness ladder. Consumes wallet, session, and
//! channel events from the bus, drives sign-in and channel initialization
//! as spawned single-flight attempts, and exposes the aggregate state
//! through a watch channel.
//!
//! Every attempt captures the wallet epoch at spawn time; a completion
//! whose epoch no longer matches is discarded, never committed. The
//! session and channel services re-check their own teardown counters at
//! commit time, so a disconnect that fully processes between the epoch
//! check and the commit still wins. Disconnect bumps the epoch and tears
//! the session and channel down unconditionally.

use crate::config::CoordinatorConfig;
use crate::domain::{CoordinatorError, ReadinessSignal, ReadinessState};
use cp_02_identity_session::{ChallengeSigner, SessionService};
use cp_03_confidential_channel::ChannelService;
use parking_lot::Mutex;
use shared_bus::{EventFilter, EventPublisher, EventTopic, InMemoryEventBus, PayrollEvent};
use shared_types::Address;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Mutable coordinator state. One lock, never held across an await.
struct Inner {
    /// Current rung of the ladder.
    state: ReadinessState,
    /// Bumped on every wallet identity change; stale completions are
    /// discarded by comparing against it.
    epoch: u64,
    /// The wallet the ladder is climbing for.
    wallet: Option<Address>,
    /// A sign-in attempt is in flight.
    auth_in_flight: bool,
    /// A channel init attempt is in flight.
    init_in_flight: bool,
    /// Soft-timeout warning for the current transient phase.
    slow: bool,
    /// Last phase error.
    error: Option<String>,
}

/// Readiness coordinator - the only writer of the readiness ladder.
pub struct ReadinessCoordinator {
    /// Session subsystem.
    session: Arc<SessionService>,
    /// Channel subsystem.
    channel: Arc<ChannelService>,
    /// Signs login challenges with the active wallet.
    challenge_signer: Arc<dyn ChallengeSigner>,
    /// The payroll contract the channel targets.
    contract: Address,
    /// Configuration.
    config: CoordinatorConfig,
    /// Event bus.
    bus: Arc<InMemoryEventBus>,
    /// Coordinator state.
    inner: Mutex<Inner>,
    /// Observable signal for consumers.
    signal_tx: watch::Sender<ReadinessSignal>,
}

impl ReadinessCoordinator {
    /// Create a coordinator for one contract address.
    pub fn new(
        session: Arc<SessionService>,
        channel: Arc<ChannelService>,
        challenge_signer: Arc<dyn ChallengeSigner>,
        contract: Address,
        config: CoordinatorConfig,
        bus: Arc<InMemoryEventBus>,
    ) -> Self {
        let (signal_tx, _) = watch::channel(ReadinessSignal::idle());
        Self {
            session,
            channel,
            challenge_signer,
            contract,
            config,
            bus,
            inner: Mutex::new(Inner {
                state: ReadinessState::Idle,
                epoch: 0,
                wallet: None,
                auth_in_flight: false,
                init_in_flight: false,
                slow: false,
                error: None,
            }),
            signal_tx,
        }
    }

    /// Subscribe to readiness signal updates.
    #[must_use]
    pub fn signal(&self) -> watch::Receiver<ReadinessSignal> {
        self.signal_tx.subscribe()
    }

    /// Current rung of the ladder.
    #[must_use]
    pub fn state(&self) -> ReadinessState {
        self.inner.lock().state
    }

    /// Whether confidential operations are permitted right now.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Consume bus events until the bus closes.
    pub async fn run(self: Arc<Self>) {
        let mut sub = self.bus.subscribe(EventFilter::topics(vec![
            EventTopic::Wallet,
            EventTopic::Session,
            EventTopic::Channel,
        ]));
        info!(contract = %self.contract, "Readiness coordinator running");
        while let Some(event) = sub.recv().await {
            self.handle_event(event).await;
        }
        debug!("Event bus closed, coordinator stopping");
    }

    /// Re-run the sign-in phase after a failure.
    ///
    /// Never triggered automatically; a rejected signature stays rejected
    /// until the user asks again.
    pub fn retry_sign_in(self: &Arc<Self>) -> Result<(), CoordinatorError> {
        let (address, epoch) = {
            let inner = self.inner.lock();
            let Some(address) = inner.wallet.clone() else {
                return Err(CoordinatorError::NotConnected);
            };
            if inner.auth_in_flight
                || !inner
                    .state
                    .can_transition_to(ReadinessState::Authenticating)
            {
                return Err(CoordinatorError::NothingToRetry(inner.state.to_string()));
            }
            (address, inner.epoch)
        };
        self.spawn_auth(address, epoch);
        Ok(())
    }

    /// Re-run the channel init phase after a failure.
    pub fn retry_channel_init(self: &Arc<Self>) -> Result<(), CoordinatorError> {
        let (address, epoch) = {
            let inner = self.inner.lock();
            let Some(address) = inner.wallet.clone() else {
                return Err(CoordinatorError::NotConnected);
            };
            if inner.init_in_flight
                || !inner.state.can_transition_to(ReadinessState::Initializing)
            {
                return Err(CoordinatorError::NothingToRetry(inner.state.to_string()));
            }
            (address, inner.epoch)
        };
        if !self.session.is_authenticated_for(&address) {
            return Err(CoordinatorError::NothingToRetry(
                self.state().to_string(),
            ));
        }
        self.spawn_init(epoch);
        Ok(())
    }

    async fn handle_event(self: &Arc<Self>, event: PayrollEvent) {
        match event {
            PayrollEvent::WalletConnected { address }
            | PayrollEvent::WalletAccountChanged { address } => {
                self.on_wallet_active(address).await;
            }
            PayrollEvent::WalletDisconnected => self.on_wallet_disconnected().await,
            PayrollEvent::SessionEstablished { address } => {
                self.on_session_established(address).await;
            }
            PayrollEvent::SessionCleared => self.on_session_cleared().await,
            PayrollEvent::ChannelInitialized { contract } => {
                self.on_channel_initialized(contract).await;
            }
            PayrollEvent::ChannelInvalidated => self.on_channel_invalidated().await,
            _ => {}
        }
    }

    /// A wallet connected or the active account switched.
    async fn on_wallet_active(self: &Arc<Self>, address: Address) {
        let (epoch, flipped) = {
            let mut inner = self.inner.lock();
            // Same wallet again (duplicate event) keeps the epoch, so an
            // in-flight attempt for it stays valid.
            let changed = inner.wallet.as_ref() != Some(&address);
            if changed {
                inner.epoch += 1;
                inner.wallet = Some(address.clone());
                inner.error = None;
            }
            let flipped = if changed || inner.state == ReadinessState::Idle {
                Self::move_to(&mut inner, ReadinessState::Connected)
            } else {
                false
            };
            self.publish_signal(&inner);
            (inner.epoch, flipped)
        };
        if flipped {
            self.announce(false).await;
        }
        self.advance(address, epoch).await;
    }

    /// Unconditional teardown. In-flight attempt flags stay set; the owning
    /// task clears them when it resolves and its stale result is discarded.
    async fn on_wallet_disconnected(self: &Arc<Self>) {
        let flipped = {
            let mut inner = self.inner.lock();
            inner.epoch += 1;
            inner.wallet = None;
            inner.error = None;
            inner.slow = false;
            let flipped = Self::move_to(&mut inner, ReadinessState::Idle);
            self.publish_signal(&inner);
            flipped
        };
        info!("Wallet disconnected, tearing down session and channel");
        self.session.force_clear().await;
        self.channel.invalidate().await;
        if flipped {
            self.announce(false).await;
        }
    }

    async fn on_session_established(self: &Arc<Self>, address: Address) {
        let epoch = {
            let inner = self.inner.lock();
            if inner.wallet.as_ref() != Some(&address) {
                return;
            }
            inner.epoch
        };
        self.ensure_channel(epoch).await;
    }

    async fn on_session_cleared(self: &Arc<Self>) {
        let flipped = {
            let mut inner = self.inner.lock();
            if inner.wallet.is_none()
                || matches!(
                    inner.state,
                    ReadinessState::Idle | ReadinessState::Connected
                )
            {
                return;
            }
            let flipped = Self::move_to(&mut inner, ReadinessState::Connected);
            self.publish_signal(&inner);
            flipped
        };
        if flipped {
            self.announce(false).await;
        }
    }

    async fn on_channel_initialized(self: &Arc<Self>, contract: Address) {
        if contract != self.contract {
            return;
        }
        let flipped = {
            let mut inner = self.inner.lock();
            if inner.wallet.is_none() || !inner.state.can_transition_to(ReadinessState::Ready) {
                return;
            }
            let flipped = Self::move_to(&mut inner, ReadinessState::Ready);
            self.publish_signal(&inner);
            flipped
        };
        if flipped {
            info!("Readiness gate open");
            self.announce(true).await;
        }
    }

    async fn on_channel_invalidated(self: &Arc<Self>) {
        let flipped = {
            let mut inner = self.inner.lock();
            if inner.state != ReadinessState::Ready {
                return;
            }
            let flipped = Self::move_to(&mut inner, ReadinessState::Authenticated);
            self.publish_signal(&inner);
            flipped
        };
        if flipped {
            self.announce(false).await;
        }
    }

    /// Decide the next phase for an active wallet.
    async fn advance(self: &Arc<Self>, address: Address, epoch: u64) {
        if self.session.is_authenticated_for(&address) {
            // Session already live for this wallet: skip sign-in.
            let proceed = {
                let mut inner = self.inner.lock();
                if inner.epoch != epoch {
                    return;
                }
                if inner.state == ReadinessState::Connected {
                    Self::move_to(&mut inner, ReadinessState::Authenticated);
                    self.publish_signal(&inner);
                }
                inner.state == ReadinessState::Authenticated
            };
            if proceed {
                self.ensure_channel(epoch).await;
            }
        } else {
            self.spawn_auth(address, epoch);
        }
    }

    /// Move to Ready if the channel already covers our contract, otherwise
    /// kick initialization.
    async fn ensure_channel(self: &Arc<Self>, epoch: u64) {
        if self.channel.is_initialized_for(&self.contract) {
            let flipped = {
                let mut inner = self.inner.lock();
                if inner.epoch != epoch
                    || !inner.state.can_transition_to(ReadinessState::Ready)
                {
                    return;
                }
                let flipped = Self::move_to(&mut inner, ReadinessState::Ready);
                self.publish_signal(&inner);
                flipped
            };
            if flipped {
                info!("Readiness gate open");
                self.announce(true).await;
            }
        } else {
            self.spawn_init(epoch);
        }
    }

    /// Spawn the sign-in attempt unless one is already in flight.
    fn spawn_auth(self: &Arc<Self>, address: Address, epoch: u64) {
        {
            let mut inner = self.inner.lock();
            if inner.auth_in_flight
                || inner.epoch != epoch
                || !inner
                    .state
                    .can_transition_to(ReadinessState::Authenticating)
            {
                return;
            }
            inner.auth_in_flight = true;
            Self::move_to(&mut inner, ReadinessState::Authenticating);
            self.publish_signal(&inner);
        }

        // Captured before the exchange starts, so a teardown at any point
        // during the attempt defeats the commit.
        let generation = self.session.generation();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            debug!(address = %address, "Sign-in attempt started");
            let result = this
                .with_slow_warning(this.session.authenticate(&address, this.challenge_signer.as_ref()))
                .await;

            let (adopt, restart) = {
                let mut inner = this.inner.lock();
                inner.auth_in_flight = false;
                inner.slow = false;
                if inner.epoch != epoch {
                    debug!("Discarding sign-in result from a previous wallet epoch");
                    this.publish_signal(&inner);
                    // An attempt for the current wallet may have been
                    // skipped while this one held the flag
                    let restart = inner
                        .wallet
                        .clone()
                        .filter(|_| inner.state == ReadinessState::Connected)
                        .map(|w| (w, inner.epoch));
                    (None, restart)
                } else {
                    match result {
                        Ok(session) => {
                            Self::move_to(&mut inner, ReadinessState::Authenticated);
                            this.publish_signal(&inner);
                            (Some(session), None)
                        }
                        Err(e) => {
                            warn!(error = %e, "Sign-in failed");
                            inner.error = Some(e.to_string());
                            Self::move_to(&mut inner, ReadinessState::Faulted);
                            this.publish_signal(&inner);
                            (None, None)
                        }
                    }
                }
            };

            if let Some(session) = adopt {
                if !this.session.adopt_if_fresh(session, generation).await {
                    debug!("Sign-in result overtaken by a teardown, not committed");
                }
            }
            if let Some((address, epoch)) = restart {
                this.spawn_auth(address, epoch);
            }
        });
    }

    /// Spawn the channel init attempt unless one is already in flight.
    fn spawn_init(self: &Arc<Self>, epoch: u64) {
        {
            let mut inner = self.inner.lock();
            if inner.init_in_flight
                || inner.epoch != epoch
                || !inner.state.can_transition_to(ReadinessState::Initializing)
            {
                return;
            }
            inner.init_in_flight = true;
            Self::move_to(&mut inner, ReadinessState::Initializing);
            self.publish_signal(&inner);
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            debug!(contract = %this.contract, "Channel init attempt started");
            let result = this
                .with_slow_warning(this.channel.run_init(&this.contract))
                .await;

            let (commit, restart) = {
                let mut inner = this.inner.lock();
                inner.init_in_flight = false;
                inner.slow = false;
                if inner.epoch != epoch {
                    debug!("Discarding channel init result from a previous wallet epoch");
                    this.publish_signal(&inner);
                    // The current epoch may have reached Authenticated while
                    // this attempt held the flag
                    let restart =
                        (inner.state == ReadinessState::Authenticated).then_some(inner.epoch);
                    (false, restart)
                } else {
                    match result {
                        Ok(()) => (true, None),
                        Err(e) => {
                            warn!(error = %e, "Channel initialization failed");
                            inner.error = Some(e.to_string());
                            Self::move_to(&mut inner, ReadinessState::Faulted);
                            this.publish_signal(&inner);
                            (false, None)
                        }
                    }
                }
            };

            if commit && !this.channel.commit_init(&this.contract).await {
                debug!("Channel init result overtaken by an invalidate, not committed");
            }
            if let Some(epoch) = restart {
                this.spawn_init(epoch);
            }
        });
    }

    /// Run a phase, flipping the slow warning if it outlives the soft
    /// timeout. The phase itself is never cancelled.
    async fn with_slow_warning<T>(self: &Arc<Self>, fut: impl Future<Output = T>) -> T {
        tokio::pin!(fut);
        tokio::select! {
            out = &mut fut => out,
            () = tokio::time::sleep(self.config.slow_warning()) => {
                {
                    let mut inner = self.inner.lock();
                    inner.slow = true;
                    self.publish_signal(&inner);
                }
                warn!("Readiness phase exceeding soft timeout");
                fut.await
            }
        }
    }

    /// Apply a guarded transition. Returns whether the ready gate flipped.
    fn move_to(inner: &mut Inner, to: ReadinessState) -> bool {
        if !inner.state.can_transition_to(to) {
            warn!(from = %inner.state, to = %to, "Ignoring illegal readiness transition");
            return false;
        }
        let was_ready = inner.state.is_ready();
        inner.state = to;
        was_ready != to.is_ready()
    }

    fn publish_signal(&self, inner: &Inner) {
        self.signal_tx.send_replace(ReadinessSignal {
            state: inner.state,
            ready: inner.state.is_ready(),
            slow: inner.slow,
            error: inner.error.clone(),
        });
    }

    async fn announce(&self, ready: bool) {
        self.bus
            .publish(PayrollEvent::ReadinessChanged { ready })
            .await;
    }
}
