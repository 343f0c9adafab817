//! Best-effort deduplication of rapid double-submitted generation calls.
//!
//! Keys live in process memory only, so the guard does not survive a
//! restart and does not coordinate across replicas. It exists to absorb
//! a double-clicked submit button, not to provide durable dedup; callers
//! that need the latter must persist the key instead.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

/// Stale in-flight entries are evicted after this long, so a crashed run
/// cannot block its key forever.
const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Tracks generation keys currently being processed.
pub struct IdempotencyGuard {
    entries: Mutex<HashMap<Uuid, Instant>>,
    ttl: Duration,
}

impl Default for IdempotencyGuard {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl IdempotencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard with a custom time-to-live for stale entries.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Claim a key for the duration of a run.
    ///
    /// Returns `false` when the key is already claimed by an in-flight
    /// run, `true` when the caller now owns it. Expired entries are
    /// swept lazily on every claim.
    pub async fn try_begin(&self, key: Uuid) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, started| now.duration_since(*started) < self.ttl);

        match entries.get(&key) {
            Some(_) => false,
            None => {
                entries.insert(key, now);
                true
            }
        }
    }

    /// Release a key once its run has finished (successfully or not).
    pub async fn finish(&self, key: Uuid) {
        let mut entries = self.entries.lock().await;
        entries.remove(&key);
    }
}
