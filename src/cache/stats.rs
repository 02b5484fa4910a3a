//! Cache Statistics Module
//!
//! Tracks read-through performance: hits, misses, upstream fetches, coalesced
//! waiters, failures, invalidations and evictions.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads served from a fresh entry
    pub hits: u64,
    /// Reads that found no fresh entry (missing or stale)
    pub misses: u64,
    /// Underlying fetches started
    pub fetches: u64,
    /// Callers that joined an already running fetch
    pub coalesced: u64,
    /// Fetches that settled with an error
    pub failed_fetches: u64,
    /// Entries removed by explicit, prefix or resource invalidation
    pub invalidated: u64,
    /// Entries dropped by the capacity bound
    pub evictions: u64,
    /// Stale entries removed on read or by a sweep
    pub expired: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_coalesced(&mut self) {
        self.coalesced += 1;
    }

    pub fn record_failed_fetch(&mut self) {
        self.failed_fetches += 1;
    }

    pub fn record_invalidated(&mut self, count: usize) {
        self.invalidated += count as u64;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
