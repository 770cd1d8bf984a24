//! # Payroll Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{Address, TxHash};

/// All events that can be published to the event bus.
///
/// Wallet events are the inputs that drive the readiness coordinator;
/// session/channel/readiness events are its observable consequences;
/// operation events report executor outcomes to the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PayrollEvent {
    // =========================================================================
    // SUBSYSTEM 1: WALLET GATEWAY
    // =========================================================================
    /// A browser wallet connected with an active account.
    WalletConnected {
        /// The active wallet address.
        address: Address,
    },

    /// The active account changed without a disconnect.
    WalletAccountChanged {
        /// The new active wallet address.
        address: Address,
    },

    /// The wallet disconnected or revoked all accounts.
    WalletDisconnected,

    // =========================================================================
    // SUBSYSTEM 2: IDENTITY SESSION
    // =========================================================================
    /// A backend session was established for a wallet address.
    SessionEstablished {
        /// The wallet address the session is keyed by.
        address: Address,
    },

    /// The backend session was cleared (sign-out or teardown).
    SessionCleared,

    // =========================================================================
    // SUBSYSTEM 3: CONFIDENTIAL CHANNEL
    // =========================================================================
    /// The encryption channel finished initializing for a contract.
    ChannelInitialized {
        /// The contract address the channel is scoped to.
        contract: Address,
    },

    /// The encryption channel was invalidated.
    ChannelInvalidated,

    // =========================================================================
    // SUBSYSTEM 4: READINESS COORDINATOR
    // =========================================================================
    /// The overall readiness gate changed.
    ReadinessChanged {
        /// Whether money-moving operations are permitted.
        ready: bool,
    },

    // =========================================================================
    // SUBSYSTEM 5: OPERATION EXECUTOR
    // =========================================================================
    /// A confidential operation was confirmed on-chain.
    OperationConfirmed {
        /// The confirmed transaction hash.
        tx_hash: TxHash,
    },

    /// A confidential operation failed before or after submission.
    OperationFailed {
        /// Failure reason passed through from the remote call.
        reason: String,
    },
}

impl PayrollEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::WalletConnected { .. }
            | Self::WalletAccountChanged { .. }
            | Self::WalletDisconnected => EventTopic::Wallet,
            Self::SessionEstablished { .. } | Self::SessionCleared => EventTopic::Session,
            Self::ChannelInitialized { .. } | Self::ChannelInvalidated => EventTopic::Channel,
            Self::ReadinessChanged { .. } => EventTopic::Readiness,
            Self::OperationConfirmed { .. } | Self::OperationFailed { .. } => EventTopic::Operation,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::WalletConnected { .. }
            | Self::WalletAccountChanged { .. }
            | Self::WalletDisconnected => 1,
            Self::SessionEstablished { .. } | Self::SessionCleared => 2,
            Self::ChannelInitialized { .. } | Self::ChannelInvalidated => 3,
            Self::ReadinessChanged { .. } => 4,
            Self::OperationConfirmed { .. } | Self::OperationFailed { .. } => 5,
        }
    }
}

/// Topics for event filtering, one per subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTopic {
    /// Subsystem 1 events (wallet gateway).
    Wallet,
    /// Subsystem 2 events (identity session).
    Session,
    /// Subsystem 3 events (confidential channel).
    Channel,
    /// Subsystem 4 events (readiness coordinator).
    Readiness,
    /// Subsystem 5 events (operation executor).
    Operation,
    /// All events (no filtering).
    All,
}

/// Filter describing which events a subscription wants.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &PayrollEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
