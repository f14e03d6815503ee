//! The owner → agents enumeration index.
//!
//! Each owner holds an ordered list of agent ids; every record carries
//! its position in that list. Insertion appends; removal swaps the last
//! element into the vacated slot and shrinks by one. Both are O(1), at
//! the cost of not preserving relative order after a removal — a
//! documented property, not an accident.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::{Address, AgentId};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct OwnerIndex {
    by_owner: HashMap<Address, Vec<AgentId>>,
}

impl OwnerIndex {
    /// Append `id` to `owner`'s list and return its position.
    pub fn append(&mut self, owner: Address, id: AgentId) -> usize {
        let list = self.by_owner.entry(owner).or_default();
        list.push(id);
        list.len() - 1
    }

    /// Remove the entry at `position` from `owner`'s list via
    /// swap-with-last-then-shrink.
    ///
    /// Returns the id that was moved into `position` (the caller must
    /// update that record's stored position), or `None` when the removed
    /// entry was the last element.
    pub fn swap_remove(&mut self, owner: Address, position: usize) -> Option<AgentId> {
        let list = self.by_owner.get_mut(&owner)?;
        if position >= list.len() {
            return None;
        }
        list.swap_remove(position);
        let moved = list.get(position).copied();
        if list.is_empty() {
            self.by_owner.remove(&owner);
        }
        moved
    }

    /// The pre-maintained list for `owner`; empty for unknown owners.
    pub fn list(&self, owner: &Address) -> &[AgentId] {
        self.by_owner
            .get(owner)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
