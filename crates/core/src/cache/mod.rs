//! In-memory result cache with insertion-order eviction and TTL expiry.
//!
//! - Entries expire `ttl` after insertion; expired entries read as absent
//!   and are purged lazily on access.
//! - Inserting past `max_size` evicts the oldest inserted entry. Reads do
//!   not refresh an entry's position.
//! - The entry map is guarded by a tokio mutex so one cache can be shared
//!   across concurrent searches.

pub mod hash;

pub use hash::fingerprint;

use crate::SearchResult;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Snapshot of cache occupancy and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Live entries.
    pub size: usize,
    /// Total `SearchResult` records held across live entries.
    pub calculated_size: usize,
    pub max_size: usize,
    /// TTL in milliseconds.
    pub ttl: u64,
}

struct CacheEntry {
    results: Vec<SearchResult>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<String>,
}

impl CacheState {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(entry)
    }

    fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let entries = &self.entries;
        self.order.retain(|k| entries.contains_key(k));
    }
}

/// Bounded map from query fingerprint to parsed results.
pub struct ResultCache {
    state: Mutex<CacheState>,
    max_size: usize,
    ttl: Duration,
}

impl ResultCache {
    /// Create a cache holding at most `max_size` entries (minimum 1).
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self { state: Mutex::new(CacheState::default()), max_size: max_size.max(1), ttl }
    }

    /// Get the cached results for `key`, or `None` if absent or expired.
    pub async fn get(&self, key: &str) -> Option<Vec<SearchResult>> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        let expired = state.entries.get(key)?.is_expired(now);
        if expired {
            state.remove(key);
            tracing::debug!("cache entry expired: {}", key);
            return None;
        }

        state.entries.get(key).map(|entry| entry.results.clone())
    }

    /// Insert or replace the results for `key`.
    ///
    /// Replacing an existing key moves it to the newest position.
    pub async fn set(&self, key: &str, results: Vec<SearchResult>) {
        let mut state = self.state.lock().await;
        state.remove(key);

        while state.entries.len() >= self.max_size {
            let Some(oldest) = state.order.pop_front() else { break };
            state.entries.remove(&oldest);
            tracing::debug!("cache evicted oldest entry: {}", oldest);
        }

        let expires_at = Instant::now() + self.ttl;
        state.entries.insert(key.to_string(), CacheEntry { results, expires_at });
        state.order.push_back(key.to_string());
    }

    /// Whether a live entry exists for `key`.
    pub async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.order.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        let mut state = self.state.lock().await;
        state.purge_expired(Instant::now());

        CacheStats {
            size: state.entries.len(),
            calculated_size: state.entries.values().map(|e| e.results.len()).sum(),
            max_size: self.max_size,
            ttl: self.ttl.as_millis() as u64,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
