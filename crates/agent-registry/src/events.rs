//! The append-only notification log.
//!
//! Every successful mutating operation appends exactly one record per
//! emitted notification; failed calls append nothing. The log is the
//! only push channel external indexers get — they replay it to
//! reconstruct current state without rescanning the ledgers. Emission is
//! deliberately decoupled from operation return values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::identity::{Address, AgentId};
use crate::time;

/// A structured notification carrying the operation's key fields, with
/// old/new values where consumers need both (cache invalidation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    AgentRegistered {
        id: AgentId,
        owner: Address,
        uri: Option<String>,
        agent_address: Option<Address>,
    },
    Transferred {
        id: AgentId,
        from: Address,
        to: Address,
    },
    DelegateApproved {
        id: AgentId,
        owner: Address,
        delegate: Option<Address>,
    },
    OperatorSet {
        owner: Address,
        operator: Address,
        approved: bool,
    },
    UriChanged {
        id: AgentId,
        old_uri: Option<String>,
        new_uri: String,
    },
    MetadataSet {
        id: AgentId,
        key: String,
        value: Vec<u8>,
    },
    WalletChanged {
        id: AgentId,
        old_wallet: Option<Address>,
        new_wallet: Option<Address>,
    },
    AgentDestroyed {
        id: AgentId,
        owner: Address,
    },
    FeedbackGiven {
        agent: AgentId,
        client: Address,
        index: u64,
        value: i64,
        decimals: u8,
        tag1: String,
        tag2: String,
        endpoint: String,
        uri: String,
        content_hash: [u8; 32],
    },
    FeedbackRevoked {
        agent: AgentId,
        client: Address,
        index: u64,
    },
    ResponseAppended {
        agent: AgentId,
        client: Address,
        index: u64,
        responder: Address,
        response_uri: String,
        response_hash: [u8; 32],
        total_responses: u64,
    },
    NameRegistered {
        name: Vec<u8>,
        agent: AgentId,
        owner: Address,
    },
    NameReleased {
        name: Vec<u8>,
        agent: AgentId,
        owner: Address,
    },
}

/// One log entry: a dense sequence number, the ledger-clock timestamp of
/// the call that produced it, and the notification itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub at: u64,
    pub event: Event,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] #{} {:?}",
            time::micros_to_rfc3339(self.at),
            self.seq,
            self.event
        )
    }
}

/// Append-only store of [`EventRecord`]s with dense sequence numbers.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` stamped with the call's execution time.
    pub(crate) fn emit(&mut self, at: u64, event: Event) {
        let seq = self.records.len() as u64;
        self.records.push(EventRecord { seq, at, event });
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `seq >= from`. The cursor read for incremental
    /// indexers; an up-to-date cursor yields an empty slice.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = (from as usize).min(self.records.len());
        &self.records[start..]
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize the full log as JSON for indexer-facing export.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.records)
            .map_err(|e| RegistryError::Serialization(e.to_string()))
    }
}
