//! Configuration for the album server.
//!
//! Settings come from an optional TOML file (`ALBUM_CONFIG`, else
//! `./album.toml` when present) and are then overlaid by environment
//! variables, so a bare `GROQ_API_KEY=... album-server` works with no file.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//!
//! [cors]
//! origins = ["https://example.github.io"]
//!
//! [providers]
//! ask_order = ["groq", "gemini", "perplexity", "openai", "deepinfra"]
//! caption_order = ["openai", "gemini"]
//! timeout_secs = 30
//!
//! [providers.groq]
//! api_key = "gsk_..."
//! model = "llama-3.1-8b-instant"
//!
//! [cache]
//! ttl_secs = 3600
//! ```

pub mod cli_config;

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use album_models::{ProviderConfig, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::cache::CacheConfig;
use crate::error::{AlbumError, Result};

pub use cli_config::{CliConfig, CliConfigError, CliConfigResult};

/// Config file used when `ALBUM_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "album.toml";

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl ServerConfig {
    /// The socket address to listen on.
    ///
    /// IP literals are used as is, bare or bracketed IPv6 included. Anything
    /// else is resolved and the first address wins.
    ///
    /// # Errors
    /// Returns an error when `host` does not resolve.
    pub async fn resolve_addr(&self) -> Result<SocketAddr> {
        let host = self.host.trim().trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }
        tokio::net::lookup_host((host, self.port))
            .await?
            .next()
            .ok_or_else(|| AlbumError::Config(format!("Host '{host}' resolved to no address")))
    }
}

/// Cross-origin settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; empty allows any origin.
    #[serde(default)]
    pub origins: Vec<String>,
}

impl CorsConfig {
    /// Origins trimmed, without trailing slashes, empties dropped.
    pub fn normalized_origins(&self) -> Vec<String> {
        self.origins
            .iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect()
    }
}

/// Per-provider overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model override.
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Provider chains and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Providers tried for questions, in order.
    #[serde(default = "default_ask_order")]
    pub ask_order: Vec<String>,
    /// Vision providers tried for captions, in order.
    #[serde(default = "default_caption_order")]
    pub caption_order: Vec<String>,
    /// Per-call deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Settings keyed by provider id (`[providers.groq]`).
    #[serde(flatten)]
    pub settings: BTreeMap<String, ProviderSettings>,
}

fn default_ask_order() -> Vec<String> {
    ProviderKind::ALL.iter().map(|k| k.id().to_string()).collect()
}

fn default_caption_order() -> Vec<String> {
    vec![ProviderKind::OpenAI.id().to_string(), ProviderKind::Gemini.id().to_string()]
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            ask_order: default_ask_order(),
            caption_order: default_caption_order(),
            timeout_secs: default_timeout_secs(),
            settings: BTreeMap::new(),
        }
    }
}

impl ProvidersConfig {
    /// Per-call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Settings for `kind`, if any were given.
    pub fn settings_for(&self, kind: ProviderKind) -> Option<&ProviderSettings> {
        self.settings.get(kind.id())
    }

    /// True when `kind` has a non-blank API key.
    pub fn has_key(&self, kind: ProviderKind) -> bool {
        self.settings_for(kind)
            .and_then(|s| s.api_key.as_deref())
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Factory input for `kind`.
    pub fn provider_config(&self, kind: ProviderKind) -> ProviderConfig {
        let mut config = ProviderConfig::new(kind).with_timeout(self.timeout());
        if let Some(settings) = self.settings_for(kind) {
            if let Some(key) = &settings.api_key {
                config = config.with_api_key(key.clone());
            }
            if let Some(model) = &settings.model {
                config = config.with_model(model.clone());
            }
            if let Some(base_url) = &settings.base_url {
                config = config.with_base_url(base_url.clone());
            }
        }
        config
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Listener.
    #[serde(default)]
    pub server: ServerConfig,
    /// CORS allow-list.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Upstream providers.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Caption cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the config file (if any) and overlays the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// is invalid.
    pub fn load() -> Result<Self> {
        let path = std::env::var("ALBUM_CONFIG")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()));
        Self::load_with(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Like `load`, with an explicit file and variable lookup.
    pub fn load_with(path: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config file");
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AlbumError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Overlays environment variables; blank values count as unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = parse_number("PORT", &port)?;
        }
        if let Some(origins) = get("CORS_ORIGINS") {
            self.cors.origins = split_list(&origins);
        }
        if let Some(order) = get("ASK_PROVIDERS") {
            self.providers.ask_order = split_list(&order);
        }
        if let Some(order) = get("CAPTION_PROVIDERS") {
            self.providers.caption_order = split_list(&order);
        }
        if let Some(secs) = get("AI_TIMEOUT_SECS") {
            self.providers.timeout_secs = parse_number("AI_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = get("CAPTION_CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_number("CAPTION_CACHE_TTL_SECS", &secs)?;
        }

        for kind in ProviderKind::ALL {
            let prefix = kind.id().to_uppercase();
            let mut key = get(kind.env_key());
            if key.is_none() && kind == ProviderKind::Gemini {
                key = get("GEMINI_API_KEY");
            }
            let model = get(&format!("{prefix}_MODEL"));
            let base_url = get(&format!("{prefix}_BASE_URL"));
            if key.is_none() && model.is_none() && base_url.is_none() {
                continue;
            }
            let settings = self.providers.settings.entry(kind.id().to_string()).or_default();
            if key.is_some() {
                settings.api_key = key;
            }
            if model.is_some() {
                settings.model = model;
            }
            if base_url.is_some() {
                settings.base_url = base_url;
            }
        }
        Ok(())
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.providers.timeout_secs == 0 {
            return Err(AlbumError::Config("providers.timeout_secs must be greater than 0".to_string()));
        }
        self.cache.validate()?;
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| AlbumError::Config(format!("{name} must be a number, got '{value}'")))
}
