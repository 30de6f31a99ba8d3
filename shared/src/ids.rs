//! Identity generation for converted telemetry items.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generates unique ids for telemetry items at conversion time.
///
/// Ids combine the signal prefix, a wall-clock timestamp, and a per-generator
/// sequence number: `"{prefix}-{unix_nanos}-{seq}"`. Each converter owns its
/// generator, so tests get deterministic sequences instead of sharing hidden
/// process-wide state. The sequence is never reset; ids are never reused,
/// even across a full telemetry clear.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator with its sequence starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id for the given signal prefix.
    pub fn next_id(&self, prefix: &str) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        format!("{prefix}-{nanos}-{seq}")
    }
}
