//! Shared trait seams between ledger components.
//!
//! The reputation ledger and the name resolver never hold a reference to
//! the concrete identity ledger; they ask an [`OwnershipStore`] at call
//! time. That keeps each component independently testable and makes the
//! authorization read an explicit, synchronous dependency.

use crate::error::Result;
use crate::identity::{Address, AgentId};

/// Read-only view of agent ownership, answered from the latest committed
/// state at the instant of the call.
pub trait OwnershipStore {
    /// Current owner of `id`.
    ///
    /// # Errors
    ///
    /// `AgentNotFound` for unknown or destroyed ids.
    fn owner_of(&self, id: AgentId) -> Result<Address>;

    /// Whether `who` holds owner-equivalent capability over `id`: the
    /// owner itself, the approved delegate for the agent, or an operator
    /// of the owner.
    ///
    /// # Errors
    ///
    /// `AgentNotFound` for unknown or destroyed ids.
    fn is_authorized(&self, id: AgentId, who: Address) -> Result<bool>;

    /// Whether `id` refers to a live agent.
    fn agent_exists(&self, id: AgentId) -> bool;
}
