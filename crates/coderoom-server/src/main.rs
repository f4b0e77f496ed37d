//! coderoom server.
//!
//! Serves the editor's single-page app, the `/ws` room endpoint and a
//! `/health` probe.
//!
//! Run with: cargo run -p coderoom-server -- --port 5000

mod app;
mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use coderoom_executor::Judge0Client;
use coderoom_session::{RoomCoordinator, SessionRegistry};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenvy::dotenv();
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("coderoom v{} starting", env!("CARGO_PKG_VERSION"));
    match env_file {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring .env file: {e}"),
    }
    if config.rapid_api_key.is_none() {
        warn!("RAPID_API_KEY is not set; code execution will fail");
    }
    if !config.static_dir.is_dir() {
        warn!(
            "Static directory {} not found; only /ws and /health will work",
            config.static_dir.display()
        );
    }

    let registry = Arc::new(SessionRegistry::with_pruning(!config.keep_empty_rooms));
    let rooms = RoomCoordinator::with_registry(registry, Judge0Client::new(config.judge0()));
    let app = app::router(rooms, &config.static_dir);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Goodbye");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to register SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT"),
        () = terminate => info!("Received SIGTERM"),
    }
}
