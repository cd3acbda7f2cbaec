//! `album serve`: run the proxy in the foreground.

use album_core::config::Config;
use album_core::server;
use anyhow::{Context, Result};

/// Loads the server configuration, applies flag overrides and serves.
pub async fn execute(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load().context("Failed to load server configuration")?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    server::run(&config).await?;
    Ok(())
}
