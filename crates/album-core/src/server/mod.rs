//! Server module for Album Core.
//!
//! This module contains the axum HTTP server for the AI proxy.

mod cors;
pub mod logging;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::ai::AiService;
use crate::config::Config;
use crate::error::Result;
pub use cors::cors_layer;
use logging::RequestLoggerLayer;
pub use routes::{AppState, MAX_BODY_BYTES};

/// Builds the full application: routes, CORS and request logging.
pub fn app(ai: Arc<AiService>, config: &Config) -> Router {
    routes::router(AppState { ai }).layer(cors_layer(&config.cors)).layer(RequestLoggerLayer)
}

/// Start the album HTTP server.
///
/// Serves until Ctrl-C or SIGTERM, then drains in-flight requests.
///
/// # Errors
///
/// Returns an error if the providers cannot be set up or the server fails to
/// bind to the configured address.
pub async fn run(config: &Config) -> Result<()> {
    let ai = Arc::new(AiService::from_config(config)?);

    if ai.ask_provider_ids().is_empty() {
        warn!("No ask provider has an API key; /api/ask will answer 502");
    }
    if ai.caption_provider_ids().is_empty() {
        warn!("No vision provider has an API key; /api/caption will answer 502");
    }
    info!(
        ask = ?ai.ask_provider_ids(),
        caption = ?ai.caption_provider_ids(),
        timeout_secs = ai.timeout().as_secs(),
        cache_ttl_secs = ai.cache().config().ttl_secs,
        "Providers ready"
    );

    let addr = config.server.resolve_addr().await?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Album server listening");

    axum::serve(listener, app(ai, config)).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Album server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
