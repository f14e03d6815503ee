//! Feedback record types and read-side result shapes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::identity::Address;

/// Upper bound on the fixed-point precision of a feedback value.
pub const MAX_SCORE_DECIMALS: u8 = 18;

/// One feedback entry, keyed externally by `(agent, client, index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Signed fixed-point score.
    pub value: i64,
    /// Decimal places of `value`, at most [`MAX_SCORE_DECIMALS`].
    pub decimals: u8,
    /// Free-text classification tags.
    pub tag1: String,
    pub tag2: String,
    /// Opaque reference to the endpoint the feedback concerns.
    pub endpoint: String,
    /// Opaque pointer to the externally hosted feedback document.
    pub uri: String,
    /// Integrity hash of that document; never interpreted here.
    pub content_hash: [u8; 32],
    /// One-way revocation flag.
    pub revoked: bool,
}

/// Caller-supplied fields of a new feedback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackInput {
    pub value: i64,
    pub decimals: u8,
    pub tag1: String,
    pub tag2: String,
    pub endpoint: String,
    pub uri: String,
    pub content_hash: [u8; 32],
}

impl FeedbackInput {
    /// A bare score with no tags or references. Test and demo shorthand.
    pub fn score(value: i64) -> Self {
        Self {
            value,
            decimals: 0,
            tag1: String::new(),
            tag2: String::new(),
            endpoint: String::new(),
            uri: String::new(),
            content_hash: [0u8; 32],
        }
    }

    /// Set both classification tags.
    pub fn with_tags(mut self, tag1: &str, tag2: &str) -> Self {
        self.tag1 = tag1.to_string();
        self.tag2 = tag2.to_string();
        self
    }
}

/// Responses recorded against one feedback entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Total responses, repeats included.
    pub count: u64,
    /// Every address that has responded at least once.
    pub responders: HashSet<Address>,
}

/// Aggregate over a set of non-revoked feedback entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    /// Matching entries.
    pub count: u64,
    /// `sum / count` with integer truncation toward zero; 0 when empty.
    pub average: i64,
}

/// Parallel-array page returned by `read_all_feedback`.
///
/// Every column has exactly one element per matching entry — the result
/// is counted before it is filled, never over- or under-allocated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPage {
    pub clients: Vec<Address>,
    pub indices: Vec<u64>,
    pub values: Vec<i64>,
    pub decimals: Vec<u8>,
    pub tag1s: Vec<String>,
    pub tag2s: Vec<String>,
    pub revoked: Vec<bool>,
}

impl FeedbackPage {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            clients: Vec::with_capacity(n),
            indices: Vec::with_capacity(n),
            values: Vec::with_capacity(n),
            decimals: Vec::with_capacity(n),
            tag1s: Vec::with_capacity(n),
            tag2s: Vec::with_capacity(n),
            revoked: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, client: Address, index: u64, record: &FeedbackRecord) {
        self.clients.push(client);
        self.indices.push(index);
        self.values.push(record.value);
        self.decimals.push(record.decimals);
        self.tag1s.push(record.tag1.clone());
        self.tag2s.push(record.tag2.clone());
        self.revoked.push(record.revoked);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// `true` when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
