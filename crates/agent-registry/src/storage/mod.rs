//! Snapshot persistence for the registry.
//!
//! Captures the four stores (identity, reputation, resolver, event log)
//! into one versioned bincode file and restores them later. The clock
//! and the signature verifier are runtime wiring, not state — the
//! caller supplies fresh ones at load time (policy signers are trait
//! objects and cannot round-trip through a file).
//!
//! File format:
//! ```text
//! bincode( SnapshotFile { version, identity, reputation, resolver, events } )
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::events::EventLog;
use crate::identity::IdentityLedger;
use crate::registry::AgentRegistry;
use crate::reputation::ReputationLedger;
use crate::resolver::NameResolver;
use crate::signature::SignatureVerifier;
use crate::time::Clock;

const SNAPSHOT_VERSION: u32 = 1;

/// Borrowed view serialized to disk.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    /// Format version number.
    version: u32,
    identity: &'a IdentityLedger,
    reputation: &'a ReputationLedger,
    resolver: &'a NameResolver,
    events: &'a EventLog,
}

/// Owned form read back from disk.
#[derive(Deserialize)]
struct SnapshotFile {
    version: u32,
    identity: IdentityLedger,
    reputation: ReputationLedger,
    resolver: NameResolver,
    events: EventLog,
}

/// Write a snapshot of `registry` to `path`, replacing any existing file.
///
/// # Errors
///
/// `Serialization` if encoding fails, `Io` for filesystem errors.
pub fn save(registry: &AgentRegistry, path: &Path) -> Result<()> {
    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        identity: &registry.identity,
        reputation: &registry.reputation,
        resolver: &registry.resolver,
        events: &registry.events,
    };
    let bytes =
        bincode::serialize(&snapshot).map_err(|e| RegistryError::Serialization(e.to_string()))?;
    std::fs::write(path, bytes)?;
    log::debug!("snapshot written to {}", path.display());
    Ok(())
}

/// Load a snapshot from `path` and rebuild a registry around the given
/// clock and verifier.
///
/// # Errors
///
/// `Io` when the file cannot be read, `Serialization` for a malformed
/// or version-mismatched snapshot.
pub fn load(path: &Path, clock: Arc<dyn Clock>, verifier: SignatureVerifier) -> Result<AgentRegistry> {
    let bytes = std::fs::read(path)?;
    let snapshot: SnapshotFile =
        bincode::deserialize(&bytes).map_err(|e| RegistryError::Serialization(e.to_string()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(RegistryError::Serialization(format!(
            "unsupported snapshot version {}",
            snapshot.version
        )));
    }
    Ok(AgentRegistry::from_parts(
        clock,
        verifier,
        snapshot.identity,
        snapshot.reputation,
        snapshot.resolver,
        snapshot.events,
    ))
}
