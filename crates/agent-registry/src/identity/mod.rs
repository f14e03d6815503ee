//! The identity ledger: agent records, ownership, delegation, wallets.

mod enumeration;
mod ledger;
mod record;

pub use ledger::IdentityLedger;
pub use record::{Address, AgentId, AgentRecord, MetadataEntry, RESERVED_METADATA_KEY};

pub(crate) use enumeration::OwnerIndex;
