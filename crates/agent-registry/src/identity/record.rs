//! Agent records and the address/id primitives.

use std::collections::HashMap;
use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Metadata key reserved for the payment wallet; rejected from generic
/// metadata writes. The wallet has its own proof-of-control flow.
pub const RESERVED_METADATA_KEY: &str = "agentWallet";

/// A 20-byte registry address.
///
/// Key holders derive their address as the first 20 bytes of
/// SHA-256(Ed25519 public key); policy signers are assigned one out of
/// band. The all-zero address is the null sentinel and is rejected
/// wherever an address is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive the address of an Ed25519 key holder.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let hash = Sha256::digest(key.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[..20]);
        Self(bytes)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Return `true` for the null address.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Unique identifier for an agent.
///
/// Ids are dense and monotonic starting at 1 and are never reused; 0 is
/// the "not found" sentinel in sentinel-returning lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl AgentId {
    /// The "no such agent" sentinel.
    pub const NONE: AgentId = AgentId(0);

    /// Return `true` for the sentinel id.
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One metadata entry supplied at registration or via `set_metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: Vec<u8>,
}

/// The authoritative record of one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Unique, never-reused id.
    pub id: AgentId,
    /// Current controlling identity. Exactly one at any time.
    pub owner: Address,
    /// Working address of the agent itself. Set only by delegated
    /// registration, immutable thereafter.
    pub agent_address: Option<Address>,
    /// Payment destination. Defaults to the owner at creation, rotatable
    /// with proof of control, cleared on ownership transfer.
    pub payment_wallet: Option<Address>,
    /// Opaque pointer to the agent's externally hosted document.
    pub uri: Option<String>,
    /// Generic metadata. The reserved wallet key never appears here.
    pub(crate) metadata: HashMap<String, Vec<u8>>,
    /// Position of `id` inside the owner's enumeration list.
    pub(crate) owner_index: usize,
}

impl AgentRecord {
    /// Look up a metadata value.
    pub fn metadata(&self, key: &str) -> Option<&[u8]> {
        self.metadata.get(key).map(Vec::as_slice)
    }

    /// Iterate over all metadata entries in unspecified order.
    pub fn metadata_iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.metadata
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
