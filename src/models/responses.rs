//! Response DTOs for the gateway's cache administration API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for prefix and resource invalidation
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// The key prefix that was purged
    pub prefix: String,
    /// Number of cached entries removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(prefix: impl Into<String>, removed: usize) -> Self {
        Self {
            prefix: prefix.into(),
            removed,
        }
    }
}

/// Response body for single-key removal (DELETE /cache/keys/*key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was removed
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed from cache", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub coalesced: u64,
    pub failed_fetches: u64,
    pub invalidated: u64,
    pub evictions: u64,
    pub expired: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Fetches currently running upstream
    pub in_flight: usize,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, in_flight: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            fetches: stats.fetches,
            coalesced: stats.coalesced,
            failed_fetches: stats.failed_fetches,
            invalidated: stats.invalidated,
            evictions: stats.evictions,
            expired: stats.expired,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            in_flight,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// API root requests are forwarded to
    pub upstream: String,
}

impl HealthResponse {
    pub fn healthy(upstream: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            upstream: upstream.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_response_serialize() {
        let resp = InvalidateResponse::new("GET_/products", 4);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("GET_/products"));
        assert!(json.contains("\"removed\":4"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("GET_/services");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("GET_/services"));
        assert!(json.contains("removed"));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let mut stats = CacheStats::new();
        for _ in 0..8 {
            stats.record_hit();
        }
        stats.record_miss();
        stats.record_miss();

        let resp = StatsResponse::new(&stats, 1);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.in_flight, 1);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy("http://localhost:5000/api");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
        assert!(json.contains("localhost:5000"));
    }
}
