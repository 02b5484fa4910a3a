//! Snapshot Module
//!
//! Optional persistence for the cache store: fresh entries are written to a
//! JSON file and restored on the next start if they are still fresh.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStore};
use crate::error::{ApiError, Result};

// == Snapshot ==
/// Serializable image of the fresh part of a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<V> {
    pub saved_at: DateTime<Utc>,
    pub entries: BTreeMap<String, CacheEntry<V>>,
}

impl<V> CacheStore<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// Captures every entry that is fresh right now.
    pub fn snapshot(&self) -> Snapshot<V> {
        let now = self.now_ms();
        let entries = self
            .iter()
            .filter(|(_, entry)| !entry.is_stale(now))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();

        Snapshot {
            saved_at: Utc::now(),
            entries,
        }
    }

    /// Loads the still-fresh entries of `snapshot`, keeping their original
    /// store time. Returns how many were restored.
    pub fn restore(&mut self, snapshot: Snapshot<V>) -> usize {
        let now = self.now_ms();
        let mut restored = 0;

        for (key, entry) in snapshot.entries {
            if entry.is_stale(now) {
                debug!(key = %key, "skipping stale snapshot entry");
                continue;
            }
            self.insert_entry(key, entry);
            restored += 1;
        }

        restored
    }

    // == Save ==
    /// Writes the fresh entries to `path`. Returns the number written.
    ///
    /// The file is written next to `path` first and renamed over it.
    pub fn save_snapshot(&self, path: &Path) -> Result<usize> {
        let snapshot = self.snapshot();
        let count = snapshot.entries.len();
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| ApiError::Snapshot(format!("serialize failed: {e}")))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)
            .map_err(|e| ApiError::Snapshot(format!("write {} failed: {e}", tmp.display())))?;
        fs::rename(&tmp, path)
            .map_err(|e| ApiError::Snapshot(format!("rename to {} failed: {e}", path.display())))?;

        info!("Saved {} cache entries to {}", count, path.display());
        Ok(count)
    }

    // == Load ==
    /// Restores entries from `path`. A missing file restores nothing.
    pub fn load_snapshot(&mut self, path: &Path) -> Result<usize> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(ApiError::Snapshot(format!(
                    "read {} failed: {e}",
                    path.display()
                )))
            }
        };

        let snapshot: Snapshot<V> = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Snapshot(format!("parse {} failed: {e}", path.display())))?;

        let restored = self.restore(snapshot);
        info!("Restored {} cache entries from {}", restored, path.display());
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "storefront_cache_{}_{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_snapshot_skips_stale_entries() {
        let clock = ManualClock::new(1_000_000);
        let mut store: CacheStore<Value> =
            CacheStore::new().with_clock(Arc::new(clock.clone()));

        store.set("GET_/products", json!([1, 2]), 10);
        store.set("GET_/banners", json!([]), 1);
        clock.advance(Duration::from_secs(90));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.entries.len(), 1);
        assert!(snapshot.entries.contains_key("GET_/products"));
    }

    #[test]
    fn test_save_and_load_snapshot() {
        let path = temp_path("save_load");
        let clock = ManualClock::new(5_000_000);

        let mut source: CacheStore<Value> =
            CacheStore::new().with_clock(Arc::new(clock.clone()));
        source.set("GET_/services", json!([{"name": "Screen repair"}]), 30);
        source.set("GET_/categories", json!(["phones"]), 1);
        assert_eq!(source.save_snapshot(&path).unwrap(), 2);

        // Two minutes later only the 30 minute entry is still fresh
        clock.advance(Duration::from_secs(120));
        let mut target: CacheStore<Value> =
            CacheStore::new().with_clock(Arc::new(clock.clone()));
        assert_eq!(target.load_snapshot(&path).unwrap(), 1);
        assert_eq!(
            target.get("GET_/services"),
            Some(json!([{"name": "Screen repair"}]))
        );
        assert_eq!(target.get("GET_/categories"), None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_snapshot_is_empty() {
        let mut store: CacheStore<Value> = CacheStore::new();
        let restored = store.load_snapshot(&temp_path("does_not_exist")).unwrap();
        assert_eq!(restored, 0);
    }

    #[test]
    fn test_load_corrupt_snapshot_fails() {
        let path = temp_path("corrupt");
        fs::write(&path, b"not json").unwrap();

        let mut store: CacheStore<Value> = CacheStore::new();
        let result = store.load_snapshot(&path);
        assert!(matches!(result, Err(ApiError::Snapshot(_))));

        let _ = fs::remove_file(&path);
    }
}
