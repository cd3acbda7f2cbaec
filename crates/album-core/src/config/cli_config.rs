//! CLI configuration file support.
//!
//! Provides configuration structure and loading for the `album` command.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// API base used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

/// CLI configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the album server.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Directory holding the local caption/tag/topic store.
    #[serde(default)]
    pub state_dir: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,

    /// Print JSON instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum CliConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),
}

/// Result type for configuration operations.
pub type CliConfigResult<T> = std::result::Result<T, CliConfigError>;

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> CliConfigResult<Self> {
        if !path.exists() {
            return Err(CliConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CliConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| CliConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// The `~/.album` directory.
    pub fn home_dir() -> PathBuf {
        std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(".")).join(".album")
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".albumrc")
    }

    /// Discover and load configuration files.
    ///
    /// Loads configuration from:
    /// 1. Global config (~/.album/config.toml)
    /// 2. Local config (./.albumrc)
    ///
    /// Local config overrides global config. Unreadable files are skipped.
    pub fn discover_and_load() -> Self {
        Self::load_layers(&[Self::default_global_path(), Self::default_local_path()])
    }

    /// Merges each readable file in `paths`, later files winning.
    pub fn load_layers(paths: &[PathBuf]) -> Self {
        let mut config = Self::default();
        for path in paths {
            match Self::load_from_file(path) {
                Ok(layer) => config.merge(&layer),
                Err(CliConfigError::NotFound(_)) => {}
                Err(e) => tracing::warn!(error = %e, "Ignoring CLI config file"),
            }
        }
        config
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref api_base) = other.api_base {
            self.api_base = Some(api_base.clone());
        }
        if let Some(ref state_dir) = other.state_dir {
            self.state_dir = Some(state_dir.clone());
        }
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }
        if other.json {
            self.json = true;
        }
    }

    /// Resolves the API base: explicit flag, then `ALBUM_API_BASE`, then the
    /// config file, then `DEFAULT_API_BASE`. Trailing slashes are removed.
    pub fn resolve_api_base(&self, flag: Option<&str>, env: Option<&str>) -> String {
        let base = [flag, env, self.api_base.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|b| !b.is_empty())
            .unwrap_or(DEFAULT_API_BASE);
        base.trim_end_matches('/').to_string()
    }

    /// Path of the local state file.
    pub fn state_path(&self) -> PathBuf {
        self.state_dir.as_ref().map_or_else(Self::home_dir, PathBuf::from).join("state.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config_content = r#"
api_base = "https://album.example.com/"
state_dir = "/tmp/album"
log_level = "debug"
json = true
"#;

        std::fs::write(&config_path, config_content).unwrap();

        let config = CliConfig::load_from_file(&config_path).unwrap();
        assert_eq!(config.api_base.as_deref(), Some("https://album.example.com/"));
        assert_eq!(config.state_dir.as_deref(), Some("/tmp/album"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.json);
    }

    #[test]
    fn test_missing_file() {
        let err = CliConfig::load_from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CliConfigError::NotFound(_)));
    }

    #[test]
    fn test_merge() {
        let mut config1 = CliConfig {
            api_base: Some("http://a".to_string()),
            log_level: Some("info".to_string()),
            ..Default::default()
        };

        let config2 = CliConfig { api_base: Some("http://b".to_string()), ..Default::default() };

        config1.merge(&config2);
        assert_eq!(config1.api_base.as_deref(), Some("http://b"));
        assert_eq!(config1.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_layers_later_wins_and_bad_files_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let local = temp_dir.path().join("local.toml");
        let broken = temp_dir.path().join("broken.toml");
        std::fs::write(&global, "api_base = \"http://global\"\nlog_level = \"warn\"").unwrap();
        std::fs::write(&local, "api_base = \"http://local\"").unwrap();
        std::fs::write(&broken, "api_base = ").unwrap();

        let config = CliConfig::load_layers(&[global, broken, local, temp_dir.path().join("missing")]);
        assert_eq!(config.api_base.as_deref(), Some("http://local"));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_resolve_api_base_precedence() {
        let config = CliConfig { api_base: Some("http://file/".to_string()), ..Default::default() };
        assert_eq!(config.resolve_api_base(Some("http://flag//"), Some("http://env")), "http://flag");
        assert_eq!(config.resolve_api_base(None, Some("http://env/")), "http://env");
        assert_eq!(config.resolve_api_base(None, Some("  ")), "http://file");
        assert_eq!(CliConfig::default().resolve_api_base(None, None), DEFAULT_API_BASE);
    }

    #[test]
    fn test_state_path() {
        let config = CliConfig { state_dir: Some("/tmp/x".to_string()), ..Default::default() };
        assert_eq!(config.state_path(), PathBuf::from("/tmp/x/state.json"));
    }
}
