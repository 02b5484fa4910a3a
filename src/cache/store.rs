//! Cache Store Module
//!
//! Keyed response storage with TTL expiry and prefix invalidation. Capacity is
//! unbounded unless a maximum is configured, in which case the least recently
//! used entry makes room for new keys.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, RecencyTracker, SystemClock};

// == Cache Store ==
/// In-memory response cache.
///
/// The store owns every entry's lifetime: entries are created by `set` and
/// destroyed by `remove`, prefix invalidation, a stale read, a sweep, or (when
/// bounded) eviction.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Last-use order, maintained only when bounded
    recency: RecencyTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Hits served through a shared borrow
    shared_hits: AtomicU64,
    /// Keys being fetched whose result may still be stored
    claims: HashSet<String>,
    /// Optional capacity bound
    max_entries: Option<usize>,
    /// Time source for freshness checks
    clock: Arc<dyn Clock>,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an unbounded store on the system clock.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyTracker::new(),
            stats: CacheStats::new(),
            shared_hits: AtomicU64::new(0),
            claims: HashSet::new(),
            max_entries: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Bounds the store to `max_entries`. `None` or `Some(0)` keeps it unbounded.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries.filter(|n| *n > 0);
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the store's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    // == Set ==
    /// Stores a value under `key` for `ttl_minutes`.
    ///
    /// An existing entry is overwritten and its TTL restarts. When bounded and
    /// full, the least recently used entry is evicted to make room.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_minutes: u64) {
        let key = key.into();

        if let Some(max) = self.max_entries {
            if !self.entries.contains_key(&key) && self.entries.len() >= max {
                self.evict_least_recent();
            }
            self.recency.touch(&key);
        }

        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl_minutes);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns a clone of the fresh value for `key`.
    ///
    /// A stale entry is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let now = self.clock.now_ms();

        let lookup = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_stale(now)).then(|| entry.value.clone()));

        match lookup {
            Some(Some(value)) => {
                self.stats.record_hit();
                if self.max_entries.is_some() {
                    self.recency.touch(key);
                }
                Some(value)
            }
            Some(None) => {
                self.drop_entry(key);
                self.stats.record_expired(1);
                self.stats.record_miss();
                debug!(key, "cache entry stale, evicted");
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Returns a clone of the fresh value for `key` through a shared borrow.
    ///
    /// Only unbounded stores answer here, since a bounded hit has to update
    /// recency. Misses are not counted; callers fall back to `get`, which
    /// also evicts a stale entry.
    pub fn get_fresh(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        if self.max_entries.is_some() {
            return None;
        }

        let now = self.clock.now_ms();
        let value = self
            .entries
            .get(key)
            .filter(|entry| !entry.is_stale(now))
            .map(|entry| entry.value.clone())?;

        self.shared_hits.fetch_add(1, Ordering::Relaxed);
        Some(value)
    }

    /// Returns the entry for `key` without touching stats or recency, even if stale.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Remove ==
    /// Deletes one entry. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.claims.remove(key);
        let removed = self.drop_entry(key);
        if removed {
            self.stats.record_invalidated(1);
        }
        removed
    }

    // == Invalidate By Prefix ==
    /// Deletes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_by_prefix(&mut self, prefix: &str) -> usize {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        self.claims.retain(|key| !key.starts_with(prefix));
        for key in &doomed {
            self.drop_entry(key);
        }

        self.stats.record_invalidated(doomed.len());
        doomed.len()
    }

    // == Purge Stale ==
    /// Removes all stale entries. Returns the number removed.
    pub fn purge_stale(&mut self) -> usize {
        let now = self.clock.now_ms();
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_stale(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            self.drop_entry(key);
        }

        self.stats.record_expired(stale.len());
        stale.len()
    }

    /// Removes every entry.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.recency.clear();
        self.claims.clear();
        self.stats.record_invalidated(count);
        self.stats.set_total_entries(0);
        count
    }

    /// Iterates over all entries, stale ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry<V>)> {
        self.entries.iter()
    }

    /// Inserts a pre-built entry as is. Used when restoring a snapshot.
    pub(crate) fn insert_entry(&mut self, key: String, entry: CacheEntry<V>) {
        if let Some(max) = self.max_entries {
            if !self.entries.contains_key(&key) && self.entries.len() >= max {
                self.evict_least_recent();
            }
            self.recency.touch(&key);
        }
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Fetch Claims ==
    /// Marks `key` as being fetched. Removing or invalidating the key before
    /// the fetch settles revokes the claim.
    pub(crate) fn claim(&mut self, key: &str) {
        self.claims.insert(key.to_string());
    }

    /// Ends the claim on `key`. Returns whether it was still held, i.e. no
    /// invalidation touched the key while it was being fetched.
    pub(crate) fn release_claim(&mut self, key: &str) -> bool {
        self.claims.remove(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.hits += self.shared_hits.load(Ordering::Relaxed);
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut CacheStats {
        &mut self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn drop_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.recency.forget(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    fn evict_least_recent(&mut self) {
        if let Some(victim) = self.recency.pop_least_recent() {
            self.entries.remove(&victim);
            self.stats.record_eviction();
            debug!(key = %victim, "cache at capacity, evicted least recently used entry");
        }
    }
}
