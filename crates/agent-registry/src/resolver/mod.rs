//! The name resolver: a strict bijection between names and agents.
//!
//! A name resolves to at most one agent and an agent holds at most one
//! name at a time. Both registration and release are gated by the
//! *current* owner of the referenced agent, looked up at call time —
//! never by whoever happened to register the name.
//!
//! Known gap, preserved on purpose: the resolver does not force a name
//! to be released before its agent is destroyed. A destroyed agent can
//! remain the target of a stale name; `resolve_owner` and
//! `release_name` on such a name fail with the agent's NotFound. The
//! ordering is a caller responsibility.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::contracts::OwnershipStore;
use crate::error::{RegistryError, Result};
use crate::events::{Event, EventLog};
use crate::identity::{Address, AgentId};

/// Longest permitted name, in bytes. Names are arbitrary bytes, not
/// necessarily UTF-8.
pub const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NameResolver {
    by_name: HashMap<Vec<u8>, AgentId>,
    by_agent: HashMap<AgentId, Vec<u8>>,
}

impl NameResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `agent`. Caller must be the agent's current owner.
    ///
    /// # Errors
    ///
    /// `InvalidName` outside 1..=64 bytes; `AgentNotFound` /
    /// `NotOwner` from the ownership check; `NameTaken` when the name is
    /// bound; `AgentAlreadyNamed` when the agent already holds one.
    pub fn register_name(
        &mut self,
        ownership: &dyn OwnershipStore,
        caller: Address,
        name: &[u8],
        agent: AgentId,
        log: &mut EventLog,
        now: u64,
    ) -> Result<()> {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(RegistryError::InvalidName(name.len()));
        }
        let owner = ownership.owner_of(agent)?;
        if owner != caller {
            return Err(RegistryError::NotOwner { caller, agent });
        }
        if self.by_name.contains_key(name) {
            return Err(RegistryError::NameTaken);
        }
        if self.by_agent.contains_key(&agent) {
            return Err(RegistryError::AgentAlreadyNamed(agent));
        }

        self.by_name.insert(name.to_vec(), agent);
        self.by_agent.insert(agent, name.to_vec());
        log::debug!("name bound to agent {agent}");
        log.emit(
            now,
            Event::NameRegistered {
                name: name.to_vec(),
                agent,
                owner,
            },
        );
        Ok(())
    }

    /// Release `name`. Caller must be the current owner of the agent the
    /// name resolves to — re-checked now, regardless of who registered.
    pub fn release_name(
        &mut self,
        ownership: &dyn OwnershipStore,
        caller: Address,
        name: &[u8],
        log: &mut EventLog,
        now: u64,
    ) -> Result<()> {
        let agent = *self.by_name.get(name).ok_or(RegistryError::NameNotFound)?;
        let owner = ownership.owner_of(agent)?;
        if owner != caller {
            return Err(RegistryError::NotOwner { caller, agent });
        }

        self.by_name.remove(name);
        self.by_agent.remove(&agent);
        log.emit(
            now,
            Event::NameReleased {
                name: name.to_vec(),
                agent,
                owner,
            },
        );
        Ok(())
    }

    /// The agent `name` resolves to; [`AgentId::NONE`] when unknown.
    pub fn resolve_name(&self, name: &[u8]) -> AgentId {
        self.by_name.get(name).copied().unwrap_or(AgentId::NONE)
    }

    /// The name currently held by `agent`, if any.
    pub fn reverse_resolve(&self, agent: AgentId) -> Option<&[u8]> {
        self.by_agent.get(&agent).map(Vec::as_slice)
    }

    /// The current owner behind `name`.
    ///
    /// # Errors
    ///
    /// `NameNotFound` for unbound names; `AgentNotFound` when the name
    /// is stale (its agent was destroyed without releasing it).
    pub fn resolve_owner(
        &self,
        ownership: &dyn OwnershipStore,
        name: &[u8],
    ) -> Result<Address> {
        let agent = *self.by_name.get(name).ok_or(RegistryError::NameNotFound)?;
        ownership.owner_of(agent)
    }

    /// Whether `name` could be registered right now: structurally valid
    /// and unbound.
    pub fn is_name_available(&self, name: &[u8]) -> bool {
        !name.is_empty() && name.len() <= MAX_NAME_LEN && !self.by_name.contains_key(name)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// `true` when no names are bound.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
