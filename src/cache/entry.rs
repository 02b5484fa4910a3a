//! Cache Entry Module
//!
//! Defines the structure for individual cached responses with TTL support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached response payload and the time it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The cached payload
    pub value: V,
    /// Store timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Lifetime in milliseconds
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stored at `now_ms` that lives for `ttl_minutes`.
    pub fn new(value: V, now_ms: u64, ttl_minutes: u64) -> Self {
        Self {
            value,
            stored_at: now_ms,
            ttl_ms: minutes_to_ms(ttl_minutes),
        }
    }

    // == Expires At ==
    /// Last instant (Unix milliseconds) at which the entry is still fresh.
    pub fn expires_at(&self) -> u64 {
        self.stored_at.saturating_add(self.ttl_ms)
    }

    // == Is Stale ==
    /// Checks if the entry is stale at `now_ms`.
    ///
    /// Boundary condition: stale only once `now > stored_at + ttl`. At exactly
    /// `stored_at + ttl` the entry is still served.
    pub fn is_stale(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at()
    }

    // == Time To Live ==
    /// Remaining lifetime at `now_ms`, zero once stale.
    pub fn ttl_remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.expires_at().saturating_sub(now_ms))
    }
}

fn minutes_to_ms(minutes: u64) -> u64 {
    minutes.saturating_mul(60_000)
}
