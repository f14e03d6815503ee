//! The reputation ledger.
//!
//! Feedback is append-only and addressed by `(agent, client, index)`,
//! with `index` 1-based and monotonic per pair. Entries are never
//! deleted; the author may flag an entry revoked, one way. Ownership
//! questions (the self-review guard) are answered by an injected
//! [`OwnershipStore`] at call time, so the guard tracks transfers.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::contracts::OwnershipStore;
use crate::error::{RegistryError, Result};
use crate::events::{Event, EventLog};
use crate::identity::{Address, AgentId};
use crate::reputation::{
    FeedbackInput, FeedbackPage, FeedbackRecord, FeedbackSummary, ResponseRecord,
    MAX_SCORE_DECIMALS,
};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReputationLedger {
    /// Feedback threads; position + 1 is the entry's index.
    feedback: HashMap<(AgentId, Address), Vec<FeedbackRecord>>,
    /// Insertion-ordered, de-duplicated clients per agent.
    clients: HashMap<AgentId, Vec<Address>>,
    /// Dedup companion to `clients`.
    known_clients: HashMap<AgentId, HashSet<Address>>,
    /// Response threads per feedback entry.
    responses: HashMap<(AgentId, Address, u64), ResponseRecord>,
}

impl ReputationLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Writes ───────────────────────────────────────────────────────────

    /// Record feedback from `caller` about `agent`.
    ///
    /// The caller must not hold any owner-equivalent capability over the
    /// agent — owners, delegates, and operators reviewing their own
    /// agent is exactly the inflation this ledger exists to resist.
    ///
    /// Returns the entry's 1-based index in the caller's thread.
    ///
    /// # Errors
    ///
    /// `DecimalsOutOfRange` above 18; `AgentNotFound` for unknown
    /// agents; `SelfReview` when the caller controls the agent.
    pub fn give_feedback(
        &mut self,
        ownership: &dyn OwnershipStore,
        caller: Address,
        agent: AgentId,
        input: FeedbackInput,
        log: &mut EventLog,
        now: u64,
    ) -> Result<u64> {
        if input.decimals > MAX_SCORE_DECIMALS {
            return Err(RegistryError::DecimalsOutOfRange(input.decimals));
        }
        if ownership.is_authorized(agent, caller)? {
            return Err(RegistryError::SelfReview(agent));
        }

        let thread = self.feedback.entry((agent, caller)).or_default();
        thread.push(FeedbackRecord {
            value: input.value,
            decimals: input.decimals,
            tag1: input.tag1.clone(),
            tag2: input.tag2.clone(),
            endpoint: input.endpoint.clone(),
            uri: input.uri.clone(),
            content_hash: input.content_hash,
            revoked: false,
        });
        let index = thread.len() as u64;

        if self.known_clients.entry(agent).or_default().insert(caller) {
            self.clients.entry(agent).or_default().push(caller);
        }

        log::debug!("feedback #{index} on agent {agent} from {caller}");
        log.emit(
            now,
            Event::FeedbackGiven {
                agent,
                client: caller,
                index,
                value: input.value,
                decimals: input.decimals,
                tag1: input.tag1,
                tag2: input.tag2,
                endpoint: input.endpoint,
                uri: input.uri,
                content_hash: input.content_hash,
            },
        );
        Ok(index)
    }

    /// Revoke the caller's own entry `(agent, caller, index)`.
    ///
    /// # Errors
    ///
    /// `FeedbackNotFound` for an index outside `[1, last]`;
    /// `AlreadyRevoked` on a second revoke — the flag never reverts.
    pub fn revoke_feedback(
        &mut self,
        caller: Address,
        agent: AgentId,
        index: u64,
        log: &mut EventLog,
        now: u64,
    ) -> Result<()> {
        let record = self
            .feedback
            .get_mut(&(agent, caller))
            .and_then(|thread| {
                index
                    .checked_sub(1)
                    .and_then(|i| thread.get_mut(i as usize))
            })
            .ok_or(RegistryError::FeedbackNotFound {
                agent,
                client: caller,
                index,
            })?;
        if record.revoked {
            return Err(RegistryError::AlreadyRevoked {
                agent,
                client: caller,
                index,
            });
        }
        record.revoked = true;
        log.emit(
            now,
            Event::FeedbackRevoked {
                agent,
                client: caller,
                index,
            },
        );
        Ok(())
    }

    /// Append a response to the feedback entry `(agent, client, index)`.
    ///
    /// Open to any caller, revoked entries included — a revocation
    /// silences the score, not the conversation. Repeat responses from
    /// one responder all count; the responder set only tracks "has ever
    /// responded". Returns the new total.
    #[allow(clippy::too_many_arguments)]
    pub fn append_response(
        &mut self,
        caller: Address,
        agent: AgentId,
        client: Address,
        index: u64,
        response_uri: String,
        response_hash: [u8; 32],
        log: &mut EventLog,
        now: u64,
    ) -> Result<u64> {
        let last = self.get_last_index(agent, client);
        if index == 0 || index > last {
            return Err(RegistryError::FeedbackNotFound {
                agent,
                client,
                index,
            });
        }
        let record = self.responses.entry((agent, client, index)).or_default();
        record.count += 1;
        record.responders.insert(caller);
        let total_responses = record.count;

        log.emit(
            now,
            Event::ResponseAppended {
                agent,
                client,
                index,
                responder: caller,
                response_uri,
                response_hash,
                total_responses,
            },
        );
        Ok(total_responses)
    }

    // ── Reads ────────────────────────────────────────────────────────────

    /// Aggregate the named clients' non-revoked entries.
    ///
    /// `clients` must be non-empty: forcing the caller to name clients
    /// keeps an unbounded population of self-registered reviewers from
    /// inflating the average. Tag filters are exact-match when present.
    ///
    /// The average is `sum / count` with integer truncation toward
    /// zero — downstream consumers reproduce it bit-for-bit.
    pub fn get_summary(
        &self,
        agent: AgentId,
        clients: &[Address],
        tag1: Option<&str>,
        tag2: Option<&str>,
    ) -> Result<FeedbackSummary> {
        if clients.is_empty() {
            return Err(RegistryError::EmptyClientFilter);
        }
        let mut count: u64 = 0;
        let mut sum: i128 = 0;
        for client in clients {
            let Some(thread) = self.feedback.get(&(agent, *client)) else {
                continue;
            };
            for record in thread {
                if record.revoked || !matches_tags(record, tag1, tag2) {
                    continue;
                }
                count += 1;
                sum += i128::from(record.value);
            }
        }
        let average = if count > 0 {
            (sum / i128::from(count)) as i64
        } else {
            0
        };
        Ok(FeedbackSummary { count, average })
    }

    /// Read one entry. Unrestricted.
    pub fn read_feedback(
        &self,
        agent: AgentId,
        client: Address,
        index: u64,
    ) -> Result<&FeedbackRecord> {
        self.feedback
            .get(&(agent, client))
            .and_then(|thread| index.checked_sub(1).and_then(|i| thread.get(i as usize)))
            .ok_or(RegistryError::FeedbackNotFound {
                agent,
                client,
                index,
            })
    }

    /// Read every matching entry into an exactly-sized parallel page.
    ///
    /// An empty `clients` filter means the agent's full client set —
    /// unlike [`Self::get_summary`], enumeration here is deliberate.
    /// Two passes: the first counts matches to size the page, the second
    /// fills it.
    pub fn read_all_feedback(
        &self,
        agent: AgentId,
        clients: &[Address],
        tag1: Option<&str>,
        tag2: Option<&str>,
        include_revoked: bool,
    ) -> FeedbackPage {
        let selected: &[Address] = if clients.is_empty() {
            self.get_clients(agent)
        } else {
            clients
        };
        let matches = |record: &FeedbackRecord| {
            (include_revoked || !record.revoked) && matches_tags(record, tag1, tag2)
        };

        let mut total = 0usize;
        for client in selected {
            if let Some(thread) = self.feedback.get(&(agent, *client)) {
                total += thread.iter().filter(|r| matches(r)).count();
            }
        }

        let mut page = FeedbackPage::with_capacity(total);
        for client in selected {
            let Some(thread) = self.feedback.get(&(agent, *client)) else {
                continue;
            };
            for (i, record) in thread.iter().enumerate() {
                if matches(record) {
                    page.push(*client, i as u64 + 1, record);
                }
            }
        }
        debug_assert_eq!(page.len(), total);
        page
    }

    /// Every client that has ever reviewed `agent`, in first-feedback
    /// order.
    pub fn get_clients(&self, agent: AgentId) -> &[Address] {
        self.clients
            .get(&agent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Highest feedback index `client` has used against `agent`; 0 when
    /// none.
    pub fn get_last_index(&self, agent: AgentId, client: Address) -> u64 {
        self.feedback
            .get(&(agent, client))
            .map(|thread| thread.len() as u64)
            .unwrap_or(0)
    }

    /// Responses recorded against `(agent, client, index)`.
    ///
    /// An empty `responders` filter returns the raw total (repeats
    /// included); a non-empty filter returns how many *distinct* filter
    /// members have responded at least once.
    pub fn get_response_count(
        &self,
        agent: AgentId,
        client: Address,
        index: u64,
        responders: &[Address],
    ) -> u64 {
        let Some(record) = self.responses.get(&(agent, client, index)) else {
            return 0;
        };
        if responders.is_empty() {
            record.count
        } else {
            let distinct: HashSet<&Address> = responders.iter().collect();
            distinct
                .into_iter()
                .filter(|r| record.responders.contains(*r))
                .count() as u64
        }
    }
}

fn matches_tags(record: &FeedbackRecord, tag1: Option<&str>, tag2: Option<&str>) -> bool {
    tag1.map_or(true, |t| record.tag1 == t) && tag2.map_or(true, |t| record.tag2 == t)
}
