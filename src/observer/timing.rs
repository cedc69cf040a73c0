//! In-flight request timing.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::events::RequestId;

/// Start instants of requests that have started but not yet completed.
#[derive(Debug, Default)]
pub struct InFlightRequests {
    started: DashMap<RequestId, Instant>,
}

impl InFlightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a start, replacing any stale entry for the same ID.
    pub fn begin(&self, id: RequestId, at: Instant) {
        self.started.insert(id, at);
    }

    /// Remove the entry for `id` and return the time elapsed until `at`.
    ///
    /// Zero if the start was never recorded or `at` precedes it.
    pub fn finish(&self, id: RequestId, at: Instant) -> Duration {
        self.started
            .remove(&id)
            .map(|(_, start)| at.saturating_duration_since(start))
            .unwrap_or_default()
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.started.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.started.len()
    }

    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}
