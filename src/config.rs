//! Configuration Module
//!
//! Handles loading and managing cache, client and gateway configuration from
//! environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::InvalidationPolicy;

/// Default TTL in minutes for cached reads.
pub const DEFAULT_CACHE_MINUTES: u64 = 30;

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// API root every endpoint is resolved against
    pub upstream_base_url: String,
    /// Bearer token sent upstream, if any
    pub api_token: Option<String>,
    /// TTL in minutes for cached reads without an explicit cache time
    pub default_cache_minutes: u64,
    /// Optional capacity bound; None keeps the cache unbounded until TTL expiry
    pub max_entries: Option<usize>,
    /// Gateway HTTP port
    pub server_port: u16,
    /// Stale sweep interval in seconds
    pub sweep_interval: u64,
    /// Upstream request timeout in seconds
    pub request_timeout: u64,
    /// When writes invalidate cached reads
    pub invalidation_policy: InvalidationPolicy,
    /// Whether the gateway serves GETs through the cache
    pub gateway_cache_reads: bool,
    /// Snapshot file loaded at startup and written at shutdown
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `UPSTREAM_BASE_URL` - API root (default: http://localhost:5000/api)
    /// - `API_TOKEN` - Bearer token (default: unset)
    /// - `DEFAULT_CACHE_MINUTES` - Read TTL in minutes (default: 30)
    /// - `MAX_ENTRIES` - Capacity bound, 0 or unset = unbounded
    /// - `SERVER_PORT` - Gateway port (default: 3000)
    /// - `SWEEP_INTERVAL` - Stale sweep frequency in seconds (default: 60)
    /// - `REQUEST_TIMEOUT` - Upstream timeout in seconds (default: 30)
    /// - `INVALIDATION_POLICY` - `always` or `on-success` (default: always)
    /// - `GATEWAY_CACHE_READS` - Cache gateway GETs (default: true)
    /// - `SNAPSHOT_PATH` - Snapshot file (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.upstream_base_url),
            api_token: env::var("API_TOKEN").ok().filter(|v| !v.is_empty()),
            default_cache_minutes: parse_var("DEFAULT_CACHE_MINUTES")
                .unwrap_or(defaults.default_cache_minutes),
            max_entries: parse_var::<usize>("MAX_ENTRIES").filter(|n| *n > 0),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            request_timeout: parse_var("REQUEST_TIMEOUT").unwrap_or(defaults.request_timeout),
            invalidation_policy: parse_var("INVALIDATION_POLICY")
                .unwrap_or(defaults.invalidation_policy),
            gateway_cache_reads: parse_var("GATEWAY_CACHE_READS")
                .unwrap_or(defaults.gateway_cache_reads),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_base_url: "http://localhost:5000/api".to_string(),
            api_token: None,
            default_cache_minutes: DEFAULT_CACHE_MINUTES,
            max_entries: None,
            server_port: 3000,
            sweep_interval: 60,
            request_timeout: 30,
            invalidation_policy: InvalidationPolicy::Always,
            gateway_cache_reads: true,
            snapshot_path: None,
        }
    }
}
