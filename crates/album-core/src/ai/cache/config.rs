//! Configuration for the caption cache.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration for the caption cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether caption caching is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds a caption stays fresh (default: 3600 = 1 hour).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum number of captions kept in memory (default: 512).
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    3600 // 1 hour
}

fn default_max_entries() -> usize {
    512
}

/// Errors that can occur during cache configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheConfigError {
    /// Invalid TTL (must be > 0).
    #[error("Invalid caption TTL: must be greater than 0")]
    InvalidTtl,

    /// Invalid max entries (must be > 0).
    #[error("Invalid max cache entries: must be greater than 0")]
    InvalidMaxEntries,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    /// Validate the cache configuration.
    ///
    /// # Errors
    /// Returns `CacheConfigError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), CacheConfigError> {
        if self.ttl_secs == 0 {
            return Err(CacheConfigError::InvalidTtl);
        }

        if self.max_entries == 0 {
            return Err(CacheConfigError::InvalidMaxEntries);
        }

        Ok(())
    }

    /// Get the TTL as a Duration.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.ttl_secs, 3600);
        assert_eq!(config.max_entries, 512);
        assert_eq!(config.ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_cache_config_validation() {
        assert!(CacheConfig::default().validate().is_ok());

        let config = CacheConfig { ttl_secs: 0, ..CacheConfig::default() };
        assert_eq!(config.validate(), Err(CacheConfigError::InvalidTtl));

        let config = CacheConfig { max_entries: 0, ..CacheConfig::default() };
        assert_eq!(config.validate(), Err(CacheConfigError::InvalidMaxEntries));
    }

    #[test]
    fn test_cache_config_partial_toml() {
        let config: CacheConfig = toml::from_str("ttl_secs = 60").unwrap();
        assert_eq!(config.ttl_secs, 60);
        assert!(config.enabled);
        assert_eq!(config.max_entries, 512);
    }
}
