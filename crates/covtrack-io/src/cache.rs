use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::loader::LoadOutcome;

/// In-memory dataset cache with an explicit expiry.
///
/// Owned by a single session; every interaction asks the cache first and the
/// loader only runs once the previous load is older than `ttl`.
#[derive(Debug)]
pub struct DatasetCache {
    ttl: Duration,
    entry: Option<CachedLoad>,
}

#[derive(Debug)]
struct CachedLoad {
    outcome: Arc<LoadOutcome>,
    loaded_at: Instant,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| now.saturating_duration_since(entry.loaded_at) < self.ttl)
    }

    /// Return the cached outcome, running `load` first if it is missing or expired.
    pub fn get_or_load<F>(&mut self, now: Instant, load: F) -> Arc<LoadOutcome>
    where
        F: FnOnce() -> LoadOutcome,
    {
        if let Some(entry) = self.entry.as_ref().filter(|_| self.is_fresh(now)) {
            return Arc::clone(&entry.outcome);
        }
        debug!(ttl_secs = self.ttl.as_secs(), "dataset cache miss");
        let outcome = Arc::new(load());
        self.entry = Some(CachedLoad {
            outcome: Arc::clone(&outcome),
            loaded_at: now,
        });
        outcome
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
