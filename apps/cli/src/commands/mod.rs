//! Command implementations for the album CLI.

pub mod albums;
pub mod ask;
pub mod caption;
pub mod health;
pub mod providers;
pub mod search;
pub mod serve;
pub mod thumb;

use std::path::PathBuf;
use std::sync::Arc;

use album_core::config::CliConfig;
use album_core::gallery::Catalog;
use album_core::store::{JsonFileStore, KeyValueStore};
use anyhow::{Context, Result};

use crate::client::ApiClient;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Merged CLI configuration.
    pub config: CliConfig,
    /// Resolved server base URL.
    pub api_base: String,
    /// Album catalog file; the builtin catalog when unset.
    pub catalog_path: Option<PathBuf>,
}

impl CommandContext {
    /// Loads the album catalog.
    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::load(self.catalog_path.as_deref()).context("Failed to load album catalog")
    }

    /// Opens the local caption/tag/topic store.
    pub fn state(&self) -> Result<Arc<dyn KeyValueStore>> {
        let path = self.config.state_path();
        let store = JsonFileStore::open(&path)
            .with_context(|| format!("Failed to open state file {}", path.display()))?;
        Ok(Arc::new(store))
    }

    /// A client for the configured server.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_base)
    }
}
