//! The single-writer facade over the three ledgers.
//!
//! [`AgentRegistry`] owns every store, the signature verifier, the
//! execution clock, and the event log. Every mutating operation takes
//! `&mut self`, so the type system enforces the serialization boundary:
//! no two mutations ever interleave, and cross-component ownership reads
//! observe the latest committed state. Hosts that want threads wrap the
//! registry in their own lock; the observable contract stays strict
//! total order.
//!
//! The clock is sampled exactly once per call. That instant decides
//! deadline validity and stamps every notification the call emits.

use std::sync::Arc;

use crate::contracts::OwnershipStore;
use crate::error::Result;
use crate::events::EventLog;
use crate::identity::{Address, AgentId, AgentRecord, IdentityLedger, MetadataEntry};
use crate::reputation::{FeedbackInput, FeedbackPage, FeedbackRecord, FeedbackSummary, ReputationLedger};
use crate::resolver::NameResolver;
use crate::signature::SignatureVerifier;
use crate::time::{Clock, SystemClock};

pub struct AgentRegistry {
    clock: Arc<dyn Clock>,
    verifier: SignatureVerifier,
    pub(crate) identity: IdentityLedger,
    pub(crate) reputation: ReputationLedger,
    pub(crate) resolver: NameResolver,
    pub(crate) events: EventLog,
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("identity", &self.identity)
            .field("reputation", &self.reputation)
            .field("resolver", &self.resolver)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl AgentRegistry {
    /// Create an empty registry on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty registry on an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            verifier: SignatureVerifier::new(),
            identity: IdentityLedger::new(),
            reputation: ReputationLedger::new(),
            resolver: NameResolver::new(),
            events: EventLog::new(),
        }
    }

    /// Rebuild a registry from previously captured stores.
    pub(crate) fn from_parts(
        clock: Arc<dyn Clock>,
        verifier: SignatureVerifier,
        identity: IdentityLedger,
        reputation: ReputationLedger,
        resolver: NameResolver,
        events: EventLog,
    ) -> Self {
        Self {
            clock,
            verifier,
            identity,
            reputation,
            resolver,
            events,
        }
    }

    /// The verifier, for registering policy signers.
    pub fn verifier_mut(&mut self) -> &mut SignatureVerifier {
        &mut self.verifier
    }

    /// The notification log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Read-only view of the identity ledger.
    pub fn identity(&self) -> &IdentityLedger {
        &self.identity
    }

    /// Read-only view of the reputation ledger.
    pub fn reputation(&self) -> &ReputationLedger {
        &self.reputation
    }

    /// Read-only view of the name resolver.
    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    fn now(&self) -> u64 {
        self.clock.now_micros()
    }

    // ── Identity operations ──────────────────────────────────────────────

    pub fn register(
        &mut self,
        caller: Address,
        uri: Option<String>,
        metadata: Vec<MetadataEntry>,
    ) -> Result<AgentId> {
        let now = self.now();
        self.identity
            .register(caller, uri, metadata, &mut self.events, now)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn register_delegated(
        &mut self,
        caller: Address,
        uri: String,
        claimed_owner: Address,
        deadline: u64,
        signature: &[u8],
    ) -> Result<AgentId> {
        let now = self.now();
        self.identity.register_delegated(
            &self.verifier,
            caller,
            uri,
            claimed_owner,
            deadline,
            signature,
            &mut self.events,
            now,
        )
    }

    pub fn transfer(&mut self, caller: Address, id: AgentId, to: Address) -> Result<()> {
        let now = self.now();
        self.identity.transfer(caller, id, to, &mut self.events, now)
    }

    pub fn approve(
        &mut self,
        caller: Address,
        id: AgentId,
        delegate: Option<Address>,
    ) -> Result<()> {
        let now = self.now();
        self.identity
            .approve(caller, id, delegate, &mut self.events, now)
    }

    pub fn set_operator(
        &mut self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<()> {
        let now = self.now();
        self.identity
            .set_operator(caller, operator, approved, &mut self.events, now)
    }

    pub fn set_uri(
        &mut self,
        caller: Address,
        id: AgentId,
        new_uri: String,
    ) -> Result<Option<String>> {
        let now = self.now();
        self.identity
            .set_uri(caller, id, new_uri, &mut self.events, now)
    }

    pub fn set_metadata(
        &mut self,
        caller: Address,
        id: AgentId,
        key: String,
        value: Vec<u8>,
    ) -> Result<()> {
        let now = self.now();
        self.identity
            .set_metadata(caller, id, key, value, &mut self.events, now)
    }

    pub fn get_metadata(&self, id: AgentId, key: &str) -> Result<Option<&[u8]>> {
        self.identity.get_metadata(id, key)
    }

    pub fn set_wallet(
        &mut self,
        caller: Address,
        id: AgentId,
        new_wallet: Address,
        deadline: u64,
        proof: &[u8],
    ) -> Result<Option<Address>> {
        let now = self.now();
        self.identity.set_wallet(
            &self.verifier,
            caller,
            id,
            new_wallet,
            deadline,
            proof,
            &mut self.events,
            now,
        )
    }

    pub fn unset_wallet(&mut self, caller: Address, id: AgentId) -> Result<()> {
        let now = self.now();
        self.identity.unset_wallet(caller, id, &mut self.events, now)
    }

    pub fn get_wallet(&self, id: AgentId) -> Result<Option<Address>> {
        self.identity.get_wallet(id)
    }

    pub fn owner_of(&self, id: AgentId) -> Result<Address> {
        self.identity.owner_of(id)
    }

    pub fn agent(&self, id: AgentId) -> Result<&AgentRecord> {
        self.identity.agent(id)
    }

    pub fn is_authorized(&self, id: AgentId, who: Address) -> Result<bool> {
        OwnershipStore::is_authorized(&self.identity, id, who)
    }

    pub fn owners_agents(&self, owner: &Address) -> &[AgentId] {
        self.identity.owners_agents(owner)
    }

    pub fn destroy(&mut self, caller: Address, id: AgentId) -> Result<()> {
        let now = self.now();
        self.identity.destroy(caller, id, &mut self.events, now)
    }

    // ── Reputation operations ────────────────────────────────────────────

    pub fn give_feedback(
        &mut self,
        caller: Address,
        agent: AgentId,
        input: FeedbackInput,
    ) -> Result<u64> {
        let now = self.now();
        self.reputation
            .give_feedback(&self.identity, caller, agent, input, &mut self.events, now)
    }

    pub fn revoke_feedback(&mut self, caller: Address, agent: AgentId, index: u64) -> Result<()> {
        let now = self.now();
        self.reputation
            .revoke_feedback(caller, agent, index, &mut self.events, now)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn append_response(
        &mut self,
        caller: Address,
        agent: AgentId,
        client: Address,
        index: u64,
        response_uri: String,
        response_hash: [u8; 32],
    ) -> Result<u64> {
        let now = self.now();
        self.reputation.append_response(
            caller,
            agent,
            client,
            index,
            response_uri,
            response_hash,
            &mut self.events,
            now,
        )
    }

    pub fn get_summary(
        &self,
        agent: AgentId,
        clients: &[Address],
        tag1: Option<&str>,
        tag2: Option<&str>,
    ) -> Result<FeedbackSummary> {
        self.reputation.get_summary(agent, clients, tag1, tag2)
    }

    pub fn read_feedback(
        &self,
        agent: AgentId,
        client: Address,
        index: u64,
    ) -> Result<&FeedbackRecord> {
        self.reputation.read_feedback(agent, client, index)
    }

    pub fn read_all_feedback(
        &self,
        agent: AgentId,
        clients: &[Address],
        tag1: Option<&str>,
        tag2: Option<&str>,
        include_revoked: bool,
    ) -> FeedbackPage {
        self.reputation
            .read_all_feedback(agent, clients, tag1, tag2, include_revoked)
    }

    pub fn get_clients(&self, agent: AgentId) -> &[Address] {
        self.reputation.get_clients(agent)
    }

    pub fn get_last_index(&self, agent: AgentId, client: Address) -> u64 {
        self.reputation.get_last_index(agent, client)
    }

    pub fn get_response_count(
        &self,
        agent: AgentId,
        client: Address,
        index: u64,
        responders: &[Address],
    ) -> u64 {
        self.reputation
            .get_response_count(agent, client, index, responders)
    }

    // ── Name operations ──────────────────────────────────────────────────

    pub fn register_name(&mut self, caller: Address, name: &[u8], agent: AgentId) -> Result<()> {
        let now = self.now();
        self.resolver
            .register_name(&self.identity, caller, name, agent, &mut self.events, now)
    }

    pub fn release_name(&mut self, caller: Address, name: &[u8]) -> Result<()> {
        let now = self.now();
        self.resolver
            .release_name(&self.identity, caller, name, &mut self.events, now)
    }

    pub fn resolve_name(&self, name: &[u8]) -> AgentId {
        self.resolver.resolve_name(name)
    }

    pub fn reverse_resolve(&self, agent: AgentId) -> Option<&[u8]> {
        self.resolver.reverse_resolve(agent)
    }

    pub fn resolve_owner(&self, name: &[u8]) -> Result<Address> {
        self.resolver.resolve_owner(&self.identity, name)
    }

    pub fn is_name_available(&self, name: &[u8]) -> bool {
        self.resolver.is_name_available(name)
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
