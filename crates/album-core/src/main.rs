//! Album Server - Entry Point
//!
//! This binary starts the album AI proxy.

use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use album_core::{config::Config, server};

#[tokio::main]
async fn main() {
    // LOG_FORMAT=json switches to one JSON object per line
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "album_core=debug,album_models=debug,info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run(&config).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
