//! Storefront Cache gateway
//!
//! Serves the Shiv Mobile Hub API through the read-through cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_cache::api::create_router;
use storefront_cache::{spawn_sweeper, ApiClient, AppState, CacheStore, Config};

/// Main entry point for the caching gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache store, restoring a snapshot if configured
/// 4. Start the background stale sweep
/// 5. Build the cached REST client and the Axum router
/// 6. Serve until SIGINT/SIGTERM, then write the snapshot
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Storefront Cache gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: upstream={}, default_ttl={}min, max_entries={:?}, port={}, sweep_interval={}s, invalidation={}",
        config.upstream_base_url,
        config.default_cache_minutes,
        config.max_entries,
        config.server_port,
        config.sweep_interval,
        config.invalidation_policy
    );

    let mut store: CacheStore<Value> = CacheStore::new().with_max_entries(config.max_entries);
    if let Some(path) = &config.snapshot_path {
        match store.load_snapshot(path) {
            Ok(restored) => info!("Warm start with {} cached responses", restored),
            Err(e) => warn!("Ignoring cache snapshot: {}", e),
        }
    }
    let store = Arc::new(RwLock::new(store));

    let sweeper = spawn_sweeper(store.clone(), config.sweep_interval);

    let client = ApiClient::from_config(&config, store.clone())
        .context("failed to create upstream client")?;
    let app = create_router(AppState::from_config(&config, client));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeper))
        .await
        .context("server error")?;

    if let Some(path) = &config.snapshot_path {
        if let Err(e) = store.read().await.save_snapshot(path) {
            warn!("Failed to save cache snapshot: {}", e);
        }
    }

    info!("Gateway shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweeper.
async fn shutdown_signal(sweeper: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweeper.abort();
    warn!("Stale sweep task aborted");
}
