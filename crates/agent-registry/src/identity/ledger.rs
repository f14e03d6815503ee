//! The identity ledger: the authoritative record of agents.
//!
//! Owns agent records, the owner enumeration index, per-agent delegate
//! approvals, and blanket operators. Every mutating operation validates
//! completely before its first write, so a failure never leaves partial
//! state behind.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::contracts::OwnershipStore;
use crate::error::{RegistryError, Result};
use crate::events::{Event, EventLog};
use crate::identity::{
    Address, AgentId, AgentRecord, MetadataEntry, OwnerIndex, RESERVED_METADATA_KEY,
};
use crate::signature::{
    delegated_registration_digest, wallet_proof_digest, SignatureVerifier,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityLedger {
    records: HashMap<AgentId, AgentRecord>,
    owner_index: OwnerIndex,
    /// Per-agent approved delegate; cleared on transfer.
    approved: HashMap<AgentId, Address>,
    /// Blanket operators: owner → addresses with owner-equivalent
    /// capability over everything that owner holds.
    operators: HashMap<Address, HashSet<Address>>,
    /// Next id to assign. Ids are dense from 1 and never reused.
    next_id: u64,
}

impl IdentityLedger {
    /// Create an empty ledger. The first agent gets id 1.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            owner_index: OwnerIndex::default(),
            approved: HashMap::new(),
            operators: HashMap::new(),
            next_id: 1,
        }
    }

    // ── Registration ─────────────────────────────────────────────────────

    /// Register a new agent. The caller becomes owner and default
    /// payment wallet.
    ///
    /// # Errors
    ///
    /// `ZeroAddress` for a null caller; `ReservedMetadataKey` when any
    /// entry uses the wallet key.
    pub fn register(
        &mut self,
        caller: Address,
        uri: Option<String>,
        metadata: Vec<MetadataEntry>,
        log: &mut EventLog,
        now: u64,
    ) -> Result<AgentId> {
        if caller.is_zero() {
            return Err(RegistryError::ZeroAddress("owner"));
        }
        for entry in &metadata {
            if entry.key == RESERVED_METADATA_KEY {
                return Err(RegistryError::ReservedMetadataKey(entry.key.clone()));
            }
        }
        let id = self.mint(caller, None, uri, metadata, log, now);
        Ok(id)
    }

    /// Register a new agent on behalf of `claimed_owner`.
    ///
    /// The caller is the agent's own working address; the signature must
    /// prove that `claimed_owner` authorized exactly this caller, URI,
    /// and deadline. This is the only path that sets `agent_address`,
    /// and it is immutable afterward.
    ///
    /// # Errors
    ///
    /// `ZeroAddress` for null parties; `SignatureInvalid` /
    /// `DeadlineExpired` when the authorization does not hold at
    /// execution time.
    #[allow(clippy::too_many_arguments)]
    pub fn register_delegated(
        &mut self,
        verifier: &SignatureVerifier,
        caller: Address,
        uri: String,
        claimed_owner: Address,
        deadline: u64,
        signature: &[u8],
        log: &mut EventLog,
        now: u64,
    ) -> Result<AgentId> {
        if claimed_owner.is_zero() {
            return Err(RegistryError::ZeroAddress("owner"));
        }
        if caller.is_zero() {
            return Err(RegistryError::ZeroAddress("agent address"));
        }
        let digest = delegated_registration_digest(&caller, &uri, deadline);
        verifier.verify(claimed_owner, &digest, signature, deadline, now)?;

        let id = self.mint(claimed_owner, Some(caller), Some(uri), Vec::new(), log, now);
        Ok(id)
    }

    fn mint(
        &mut self,
        owner: Address,
        agent_address: Option<Address>,
        uri: Option<String>,
        metadata: Vec<MetadataEntry>,
        log: &mut EventLog,
        now: u64,
    ) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;

        let mut map = HashMap::with_capacity(metadata.len());
        for entry in &metadata {
            map.insert(entry.key.clone(), entry.value.clone());
        }
        self.records.insert(
            id,
            AgentRecord {
                id,
                owner,
                agent_address,
                payment_wallet: Some(owner),
                uri: uri.clone(),
                metadata: map,
                owner_index: 0,
            },
        );
        self.ownership_changed(id, None, Some(owner), log, now);

        log::debug!("registered agent {id} for owner {owner}");
        log.emit(
            now,
            Event::AgentRegistered {
                id,
                owner,
                uri,
                agent_address,
            },
        );
        for entry in metadata {
            log.emit(
                now,
                Event::MetadataSet {
                    id,
                    key: entry.key,
                    value: entry.value,
                },
            );
        }
        id
    }

    // ── Ownership ────────────────────────────────────────────────────────

    /// Transfer control of `id` to `to`.
    ///
    /// The caller must hold owner-equivalent capability. A transfer
    /// between two distinct owners clears the payment wallet and the
    /// per-agent delegate; a self-transfer changes nothing but still
    /// notifies.
    pub fn transfer(
        &mut self,
        caller: Address,
        id: AgentId,
        to: Address,
        log: &mut EventLog,
        now: u64,
    ) -> Result<()> {
        let record = self.require(id)?;
        let from = record.owner;
        if !self.holds_capability(record, caller) {
            return Err(RegistryError::NotAuthorized { caller, agent: id });
        }
        if to.is_zero() {
            return Err(RegistryError::ZeroAddress("recipient"));
        }

        if from != to {
            if let Some(record) = self.records.get_mut(&id) {
                record.owner = to;
            }
            self.ownership_changed(id, Some(from), Some(to), log, now);
        }
        log::debug!("agent {id} transferred {from} -> {to}");
        log.emit(now, Event::Transferred { id, from, to });
        Ok(())
    }

    /// Approve `delegate` for `id`, or clear the approval with `None`.
    /// Owner or operator only.
    pub fn approve(
        &mut self,
        caller: Address,
        id: AgentId,
        delegate: Option<Address>,
        log: &mut EventLog,
        now: u64,
    ) -> Result<()> {
        let record = self.require(id)?;
        let owner = record.owner;
        let caller_is_operator = self
            .operators
            .get(&owner)
            .is_some_and(|ops| ops.contains(&caller));
        if owner != caller && !caller_is_operator {
            return Err(RegistryError::NotAuthorized { caller, agent: id });
        }
        match delegate {
            Some(d) if d.is_zero() => return Err(RegistryError::ZeroAddress("delegate")),
            Some(d) => {
                self.approved.insert(id, d);
            }
            None => {
                self.approved.remove(&id);
            }
        }
        log.emit(now, Event::DelegateApproved { id, owner, delegate });
        Ok(())
    }

    /// Grant or revoke `operator`'s owner-equivalent capability over
    /// everything the caller owns, now and in the future.
    pub fn set_operator(
        &mut self,
        caller: Address,
        operator: Address,
        approved: bool,
        log: &mut EventLog,
        now: u64,
    ) -> Result<()> {
        if operator.is_zero() {
            return Err(RegistryError::ZeroAddress("operator"));
        }
        if approved {
            self.operators.entry(caller).or_default().insert(operator);
        } else if let Some(ops) = self.operators.get_mut(&caller) {
            ops.remove(&operator);
            if ops.is_empty() {
                self.operators.remove(&caller);
            }
        }
        log.emit(
            now,
            Event::OperatorSet {
                owner: caller,
                operator,
                approved,
            },
        );
        Ok(())
    }

    /// Destroy `id`. Strict current-owner only — delegates and operators
    /// cannot destroy. Clears the wallet, removes the agent from the
    /// owner's enumeration, and permanently invalidates the id.
    pub fn destroy(
        &mut self,
        caller: Address,
        id: AgentId,
        log: &mut EventLog,
        now: u64,
    ) -> Result<()> {
        let record = self.require(id)?;
        let owner = record.owner;
        if owner != caller {
            return Err(RegistryError::NotOwner { caller, agent: id });
        }

        if let Some(record) = self.records.get_mut(&id) {
            if let Some(old) = record.payment_wallet.take() {
                log.emit(
                    now,
                    Event::WalletChanged {
                        id,
                        old_wallet: Some(old),
                        new_wallet: None,
                    },
                );
            }
        }
        self.ownership_changed(id, Some(owner), None, log, now);
        self.approved.remove(&id);
        self.records.remove(&id);

        log::debug!("agent {id} destroyed by {owner}");
        log.emit(now, Event::AgentDestroyed { id, owner });
        Ok(())
    }

    /// Ownership-change hook. Runs on every transfer of control,
    /// creation and destruction included.
    ///
    /// Keeps the enumeration index consistent, and — only for an actual
    /// transfer between two distinct live owners — drops the payment
    /// wallet and the per-agent delegate so neither silently survives a
    /// change of control.
    fn ownership_changed(
        &mut self,
        id: AgentId,
        from: Option<Address>,
        to: Option<Address>,
        log: &mut EventLog,
        now: u64,
    ) {
        if let Some(prev) = from {
            if let Some(position) = self.records.get(&id).map(|r| r.owner_index) {
                if let Some(moved) = self.owner_index.swap_remove(prev, position) {
                    if let Some(moved_record) = self.records.get_mut(&moved) {
                        moved_record.owner_index = position;
                    }
                }
            }
        }
        if let Some(next) = to {
            let position = self.owner_index.append(next, id);
            if let Some(record) = self.records.get_mut(&id) {
                record.owner_index = position;
            }
        }
        if let (Some(prev), Some(next)) = (from, to) {
            if prev != next {
                self.approved.remove(&id);
                if let Some(record) = self.records.get_mut(&id) {
                    if let Some(old) = record.payment_wallet.take() {
                        log.emit(
                            now,
                            Event::WalletChanged {
                                id,
                                old_wallet: Some(old),
                                new_wallet: None,
                            },
                        );
                    }
                }
            }
        }
    }

    // ── URI and metadata ─────────────────────────────────────────────────

    /// Replace the agent's URI. Owner or delegate only. Returns the old
    /// URI; the notification carries both old and new so consumers can
    /// invalidate caches.
    pub fn set_uri(
        &mut self,
        caller: Address,
        id: AgentId,
        new_uri: String,
        log: &mut EventLog,
        now: u64,
    ) -> Result<Option<String>> {
        self.require_capability(id, caller)?;
        let record = self
            .records
            .get_mut(&id)
            .ok_or(RegistryError::AgentNotFound(id))?;
        let old_uri = record.uri.replace(new_uri.clone());
        log.emit(
            now,
            Event::UriChanged {
                id,
                old_uri: old_uri.clone(),
                new_uri,
            },
        );
        Ok(old_uri)
    }

    /// Set a generic metadata entry. Owner or delegate only; the wallet
    /// key is reserved.
    pub fn set_metadata(
        &mut self,
        caller: Address,
        id: AgentId,
        key: String,
        value: Vec<u8>,
        log: &mut EventLog,
        now: u64,
    ) -> Result<()> {
        self.require_capability(id, caller)?;
        if key == RESERVED_METADATA_KEY {
            return Err(RegistryError::ReservedMetadataKey(key));
        }
        let record = self
            .records
            .get_mut(&id)
            .ok_or(RegistryError::AgentNotFound(id))?;
        record.metadata.insert(key.clone(), value.clone());
        log.emit(now, Event::MetadataSet { id, key, value });
        Ok(())
    }

    /// Read a metadata entry. Unrestricted.
    pub fn get_metadata(&self, id: AgentId, key: &str) -> Result<Option<&[u8]>> {
        Ok(self.require(id)?.metadata(key))
    }

    // ── Payment wallet ───────────────────────────────────────────────────

    /// Rotate the payment wallet to `new_wallet`.
    ///
    /// Double authorization: the caller must hold owner-equivalent
    /// capability over the agent, and `proof` must show that
    /// `new_wallet` itself consented to `(id, new_wallet, deadline)` —
    /// an unauthorized rotation never silently no-ops, and a wallet can
    /// never be pointed at an address that did not agree to receive.
    ///
    /// Returns the previous wallet.
    #[allow(clippy::too_many_arguments)]
    pub fn set_wallet(
        &mut self,
        verifier: &SignatureVerifier,
        caller: Address,
        id: AgentId,
        new_wallet: Address,
        deadline: u64,
        proof: &[u8],
        log: &mut EventLog,
        now: u64,
    ) -> Result<Option<Address>> {
        self.require_capability(id, caller)?;
        if new_wallet.is_zero() {
            return Err(RegistryError::ZeroAddress("wallet"));
        }
        let digest = wallet_proof_digest(id, &new_wallet, deadline);
        verifier.verify(new_wallet, &digest, proof, deadline, now)?;

        let record = self
            .records
            .get_mut(&id)
            .ok_or(RegistryError::AgentNotFound(id))?;
        let old_wallet = record.payment_wallet.replace(new_wallet);
        log::debug!("agent {id} wallet rotated to {new_wallet}");
        log.emit(
            now,
            Event::WalletChanged {
                id,
                old_wallet,
                new_wallet: Some(new_wallet),
            },
        );
        Ok(old_wallet)
    }

    /// Clear the payment wallet. Owner or delegate only.
    pub fn unset_wallet(
        &mut self,
        caller: Address,
        id: AgentId,
        log: &mut EventLog,
        now: u64,
    ) -> Result<()> {
        self.require_capability(id, caller)?;
        let record = self
            .records
            .get_mut(&id)
            .ok_or(RegistryError::AgentNotFound(id))?;
        let old_wallet = record.payment_wallet.take();
        log.emit(
            now,
            Event::WalletChanged {
                id,
                old_wallet,
                new_wallet: None,
            },
        );
        Ok(())
    }

    /// Current payment wallet. Unrestricted read.
    pub fn get_wallet(&self, id: AgentId) -> Result<Option<Address>> {
        Ok(self.require(id)?.payment_wallet)
    }

    // ── Reads ────────────────────────────────────────────────────────────

    /// Current owner of `id`.
    pub fn owner_of(&self, id: AgentId) -> Result<Address> {
        Ok(self.require(id)?.owner)
    }

    /// The agent's URI.
    pub fn agent_uri(&self, id: AgentId) -> Result<Option<&str>> {
        Ok(self.require(id)?.uri.as_deref())
    }

    /// The agent's immutable working address, when registered delegated.
    pub fn agent_address(&self, id: AgentId) -> Result<Option<Address>> {
        Ok(self.require(id)?.agent_address)
    }

    /// The full record for `id`.
    pub fn agent(&self, id: AgentId) -> Result<&AgentRecord> {
        self.require(id)
    }

    /// All agents currently owned by `owner`. O(1): the list is
    /// maintained on every ownership change, never recomputed. Order is
    /// insertion order disturbed by swap-and-pop removals.
    pub fn owners_agents(&self, owner: &Address) -> &[AgentId] {
        self.owner_index.list(owner)
    }

    /// Number of live agents.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when no agents are registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn require(&self, id: AgentId) -> Result<&AgentRecord> {
        self.records
            .get(&id)
            .ok_or(RegistryError::AgentNotFound(id))
    }

    fn require_capability(&self, id: AgentId, caller: Address) -> Result<()> {
        let record = self.require(id)?;
        if self.holds_capability(record, caller) {
            Ok(())
        } else {
            Err(RegistryError::NotAuthorized { caller, agent: id })
        }
    }

    fn holds_capability(&self, record: &AgentRecord, who: Address) -> bool {
        record.owner == who
            || self.approved.get(&record.id) == Some(&who)
            || self
                .operators
                .get(&record.owner)
                .is_some_and(|ops| ops.contains(&who))
    }
}

impl Default for IdentityLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl OwnershipStore for IdentityLedger {
    fn owner_of(&self, id: AgentId) -> Result<Address> {
        IdentityLedger::owner_of(self, id)
    }

    fn is_authorized(&self, id: AgentId, who: Address) -> Result<bool> {
        Ok(self.holds_capability(self.require(id)?, who))
    }

    fn agent_exists(&self, id: AgentId) -> bool {
        self.records.contains_key(&id)
    }
}
