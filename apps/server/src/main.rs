//! # Brand POS Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Server Startup                               │
//! │                                                                         │
//! │  ServerConfig::load ──► Database::new (migrations) ──► axum::serve     │
//! │                                                          │              │
//! │                                           Ctrl+C / SIGTERM              │
//! │                                                          ▼              │
//! │                                               graceful shutdown,        │
//! │                                               pool closed               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use brandpos_db::{Database, DbConfig};
use brandpos_server::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,brandpos=debug,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!("Starting Brand POS server...");

    // Load configuration
    let config = ServerConfig::load().context("Failed to load configuration")?;
    info!(
        port = config.port,
        database = %config.database_path,
        cors_origin = %config.cors_origin,
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("BRANDPOS_JWT_SECRET is not set; admin tokens are signed with the development secret");
    }

    // Open database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState::new(db.clone(), config));
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
