//! Cache Module
//!
//! Read-through response cache with TTL expiry, prefix invalidation and
//! single-flight fetching.

mod clock;
mod entry;
mod fetcher;
mod invalidator;
pub mod key;
mod lru;
mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use fetcher::ReadThrough;
pub use invalidator::{InvalidationPolicy, Invalidator};
pub use key::{generate_cache_key, Method};
pub use lru::RecencyTracker;
pub use snapshot::Snapshot;
pub use stats::CacheStats;
pub use store::CacheStore;
