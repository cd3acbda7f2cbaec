//! CLI configuration loading and merging.

use album_core::config::CliConfig;

/// Environment variable overriding the server base URL.
pub const API_BASE_ENV: &str = "ALBUM_API_BASE";

/// Load and merge CLI configuration.
///
/// Configuration precedence:
/// 1. CLI arguments (handled by clap)
/// 2. Environment variables
/// 3. Local config file (./.albumrc)
/// 4. Global config file (~/.album/config.toml)
/// 5. Defaults
pub fn load_config() -> CliConfig {
    CliConfig::discover_and_load()
}

/// Resolves the server base URL from the flag, environment and config.
pub fn api_base(config: &CliConfig, flag: Option<&str>) -> String {
    let env = std::env::var(API_BASE_ENV).ok();
    config.resolve_api_base(flag, env.as_deref())
}
