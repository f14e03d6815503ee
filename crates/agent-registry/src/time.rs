//! Time utilities for AgentRegistry.
//!
//! All timestamps are Unix epoch microseconds (u64). The ledger samples
//! its clock exactly once per mutating call; that instant is used for
//! deadline checks and event timestamps alike.

use std::sync::atomic::{AtomicU64, Ordering};

/// Return the current time as microseconds since Unix epoch.
pub fn now_micros() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_micros() as u64
}

/// Convert microseconds to an RFC 3339 string.
pub fn micros_to_rfc3339(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    let nsecs = ((micros % 1_000_000) * 1000) as u32;
    let dt = chrono::DateTime::from_timestamp(secs, nsecs).unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}

/// Source of the ledger's execution-time clock.
///
/// Injected into [`crate::registry::AgentRegistry`] so that deadline
/// evaluation stays deterministic under test.
pub trait Clock: Send + Sync {
    /// Current time as microseconds since Unix epoch.
    fn now_micros(&self) -> u64;
}

/// Wall-clock time. The default for production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        now_micros()
    }
}

/// A clock that only moves when told to. For tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    /// Create a manual clock at `micros`.
    pub fn new(micros: u64) -> Self {
        Self(AtomicU64::new(micros))
    }

    /// Set the clock to `micros`.
    pub fn set(&self, micros: u64) {
        self.0.store(micros, Ordering::Relaxed);
    }

    /// Advance the clock by `delta` microseconds.
    pub fn advance(&self, delta: u64) {
        self.0.fetch_add(delta, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
