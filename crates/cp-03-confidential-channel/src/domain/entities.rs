//! # Domain Entities
//!
//! Channel state and the single-use encrypted value.

use serde::{Deserialize, Serialize};
use shared_types::{Address, CiphertextHandle, ZkProof};
use std::fmt;

/// Initialization state of the channel for one contract address.
///
/// Created lazily on first need and never implicitly destroyed; re-init
/// for the same contract is a no-op, and a wallet disconnect invalidates
/// it explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    /// Contract the channel is scoped to.
    pub contract_address: Address,
    /// Whether encrypt/decrypt are permitted.
    pub initialized: bool,
    /// Whether initialization is in progress.
    pub initializing: bool,
    /// Last initialization error, if any.
    pub error: Option<String>,
}

impl ChannelState {
    /// State while initialization is running.
    #[must_use]
    pub fn initializing(contract_address: Address) -> Self {
        Self {
            contract_address,
            initialized: false,
            initializing: true,
            error: None,
        }
    }

    /// State after successful initialization.
    #[must_use]
    pub fn initialized(contract_address: Address) -> Self {
        Self {
            contract_address,
            initialized: true,
            initializing: false,
            error: None,
        }
    }

    /// State after failed initialization.
    #[must_use]
    pub fn failed(contract_address: Address, error: String) -> Self {
        Self {
            contract_address,
            initialized: false,
            initializing: false,
            error: Some(error),
        }
    }
}

/// An encrypted value ready for exactly one contract call.
///
/// Deliberately not `Clone`: the proof must never be cached and resent, so
/// consuming the value by move is the only way to submit it.
#[derive(PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidentialValue {
    handle: CiphertextHandle,
    proof: ZkProof,
}

impl ConfidentialValue {
    /// Pair a handle with its construction proof.
    #[must_use]
    pub fn new(handle: CiphertextHandle, proof: ZkProof) -> Self {
        Self { handle, proof }
    }

    /// The ciphertext handle (safe to reference before submission).
    #[must_use]
    pub fn handle(&self) -> &CiphertextHandle {
        &self.handle
    }

    /// Consume the value for submission.
    #[must_use]
    pub fn into_parts(self) -> (CiphertextHandle, ZkProof) {
        (self.handle, self.proof)
    }
}

impl fmt::Debug for ConfidentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Handle is an opaque reference; proof stays redacted.
        write!(
            f,
            "ConfidentialValue {{ handle: {}, proof: {:?} }}",
            self.handle, self.proof
        )
    }
}

/// A wallet-signed permission to decrypt one handle for one contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuthorization {
    /// The account that signed.
    pub signer: Address,
    /// The payload that was signed, scoped to `(handle, contract)`.
    pub payload: Vec<u8>,
    /// The wallet signature over `payload`.
    pub signature: Vec<u8>,
}
