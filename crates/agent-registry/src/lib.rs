//! AgentRegistry — a decentralized registry for AI agents.
//!
//! Binds a unique human-readable name and a cryptographically verifiable
//! identity to an agent, tracks delegated control of its payment wallet,
//! and accumulates revocable reputation signals from clients.
//!
//! Three ledger components cooperate behind a single-writer facade:
//!
//! - [`IdentityLedger`] — agent records, ownership, delegation, wallets
//! - [`ReputationLedger`] — per-client feedback threads and aggregation
//! - [`NameResolver`] — the bijective name ↔ agent mapping
//!
//! Every successful mutation appends a record to the [`EventLog`] so that
//! external indexers can reconstruct state without rescanning.

pub mod contracts;
pub mod crypto;
pub mod error;
pub mod events;
pub mod identity;
pub mod registry;
pub mod reputation;
pub mod resolver;
pub mod signature;
pub mod storage;
pub mod time;

// Re-export primary types
pub use contracts::OwnershipStore;
pub use error::{ErrorKind, RegistryError, Result};
pub use events::{Event, EventLog, EventRecord};
pub use identity::{
    Address, AgentId, AgentRecord, IdentityLedger, MetadataEntry, RESERVED_METADATA_KEY,
};
pub use registry::AgentRegistry;
pub use reputation::{
    FeedbackInput, FeedbackPage, FeedbackRecord, FeedbackSummary, ReputationLedger, ResponseRecord,
    MAX_SCORE_DECIMALS,
};
pub use resolver::{NameResolver, MAX_NAME_LEN};
pub use signature::{
    authorization_blob, delegated_registration_digest, wallet_proof_digest, SignatureVerifier,
    SignerPolicy,
};
pub use time::{Clock, ManualClock, SystemClock};
