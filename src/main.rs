//! Render Service - Renders pages of remotely stored documents
//!
//! Serves page counts, page dimensions and PNG renderings of documents held
//! in a remote document store, caching the fetched documents in memory.

use std::sync::Arc;

use anyhow::Context;
use tokio::{signal, sync::watch};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use render_service::render::RenderEngine;
use render_service::{create_router, spawn_sweeper, AppState, Config};

/// Main entry point for the render service.
///
/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Build and configure the document cache
/// 4. Start the background eviction sweeper
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured address
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.json_logs);

    info!("Starting Render Service");
    info!(
        "Configuration loaded: doc_url={}, cache_size={}MB, retention={}s, cleanup_interval={}s, serialization={:?}",
        config.doc_url,
        config.cache_size_mb,
        config.retention,
        config.cleanup_interval,
        config.fetch_serialization
    );

    let state = AppState::from_config(&config, render_engine())
        .await
        .with_context(|| format!("Invalid document store URL: {}", config.doc_url))?;
    info!("Document cache initialized");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = spawn_sweeper(
        state.cache.clone(),
        config.cleanup_interval(),
        config.retention(),
        shutdown_rx.clone(),
    );
    info!("Cache sweeper started");

    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    let mut server_shutdown = shutdown_rx;
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.changed().await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(config.shutdown_delay(), &mut server).await {
        Ok(Ok(Ok(()))) => info!("Server shutdown complete"),
        Ok(Ok(Err(e))) => error!("Server error: {}", e),
        Ok(Err(e)) => error!("Server task failed: {}", e),
        Err(_) => {
            warn!(
                "Requests still running after {}s, closing connections",
                config.shutdown_delay
            );
            server.abort();
        }
    }

    if let Err(e) = sweeper.await {
        error!("Cache sweeper failed: {}", e);
    }

    info!("Render Service stopped");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// Defaults to "info" for this crate and tower_http, can be overridden with
/// the RUST_LOG env var.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "render_service=info,tower_http=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[cfg(feature = "mupdf")]
fn render_engine() -> Arc<dyn RenderEngine> {
    info!("Rendering with MuPDF");
    Arc::new(render_service::render::MupdfEngine::new())
}

#[cfg(not(feature = "mupdf"))]
fn render_engine() -> Arc<dyn RenderEngine> {
    warn!("Built without the mupdf feature, render requests will fail");
    Arc::new(render_service::render::UnavailableEngine)
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
