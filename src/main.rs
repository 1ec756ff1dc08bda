//! Formcache - bounded draft-form cache service
//!
//! Server entry point wiring the draft cache, its sweep task, and the
//! submission API behind the caching and rate-limiting middleware.

mod api;
mod backing;
mod config;
mod error;
mod forms;
mod middleware;
mod models;
mod tasks;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use backing::MemoryTtlStore;
use config::Config;
use forms::{FileBackend, FormCache};
use middleware::{RateLimiter, ResponseCache};
use tasks::SweepTask;

/// Main entry point for the form cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Restore the draft cache from file storage
/// 4. Start the background draft sweep task
/// 5. Create the backing store, limiter, and response cache
/// 6. Start the HTTP server on the configured port
/// 7. On SIGINT/SIGTERM: stop the sweep, flush the draft cache, exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting form cache service");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_ttl={}s, rate_limit={}/{}s, sweep_interval={}s",
        config.server_port,
        config.response_cache_ttl,
        config.rate_limit_max,
        config.rate_limit_window,
        config.sweep_interval
    );

    // Restore drafts from file storage
    let backend = Arc::new(FileBackend::new(config.form_storage_dir.clone()));
    let form_cache = FormCache::new(backend);
    info!("Draft cache initialized");

    // Start the sweep task: one pass shortly after boot, then periodic
    let sweep = SweepTask::start(
        form_cache.clone(),
        Duration::from_secs(1),
        Duration::from_secs(config.sweep_interval),
    );
    info!("Draft sweep task started");

    // Backing store shared by the response cache and the rate limiter
    let backing = Arc::new(MemoryTtlStore::new());
    let limiter = Arc::new(RateLimiter::new(
        backing.clone(),
        config.rate_limit_max,
        config.rate_limit_window,
    ));
    let response_cache = Arc::new(ResponseCache::new(backing, config.response_cache_ttl));

    // Create router with all endpoints
    let state = AppState::new(form_cache.clone(), limiter);
    let app = create_router(state, response_cache);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop background work and persist the final draft state
    sweep.stop();
    form_cache.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
}
