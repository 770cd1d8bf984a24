//! # Common Entities
//!
//! Value types for addresses, transaction hashes, and encrypted references.

use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A wallet or contract address: `0x` followed by 40 hex characters,
/// stored normalized to lowercase so equality is case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address string.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let hex_part = raw
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidAddress(raw.to_string()))?;
        if hex_part.len() != 40 || hex::decode(hex_part).is_err() {
            return Err(TypeError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    /// The normalized address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transaction hash: `0x` followed by 64 hex characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Parse a transaction hash string.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let hex_part = raw
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidTxHash(raw.to_string()))?;
        if hex_part.len() != 64 || hex::decode(hex_part).is_err() {
            return Err(TypeError::InvalidTxHash(raw.to_string()));
        }
        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    /// Build a hash from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// The hash string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque reference to an encrypted value held on-chain.
///
/// The handle is not the ciphertext itself; it is safe to log and compare,
/// and the contract is the only party that can resolve it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CiphertextHandle(String);

impl CiphertextHandle {
    /// Wrap a raw handle string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The handle string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A proof that a ciphertext was validly constructed.
///
/// `Debug` deliberately prints only the length: proof bytes must never
/// reach logs or UI output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZkProof(Vec<u8>);

impl ZkProof {
    /// Wrap raw proof bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Proof bytes, for submission to the contract only.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Proof length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the proof is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ZkProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZkProof({} bytes)", self.0.len())
    }
}
