//! Configuration loading for Parlor.
//!
//! Resolves the data directory, reads `config.toml` from it into
//! [`GlobalConfig`], and applies the `SESSION_CACHE_SIZE` environment
//! override. Missing or malformed input falls back to defaults.

use std::path::{Path, PathBuf};

use parlor_types::config::GlobalConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PARLOR_DATA_DIR";

/// Environment variable overriding the session cache capacity.
pub const CACHE_SIZE_ENV: &str = "SESSION_CACHE_SIZE";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PARLOR_DATA_DIR` environment variable
/// 2. `~/.parlor`
/// 3. `.parlor` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parlor");
    }

    PathBuf::from(".parlor")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Resolve the session cache capacity.
///
/// `SESSION_CACHE_SIZE` wins over `session_cache_size` from `config.toml`.
pub fn resolve_cache_size(config: &GlobalConfig) -> usize {
    let env_value = std::env::var(CACHE_SIZE_ENV).ok();
    cache_size_from(env_value.as_deref(), config.session_cache_size)
}

/// Pick the cache capacity from an optional override string.
///
/// Non-numeric or zero overrides are ignored with a warning. A zero configured
/// value is raised to one, since the cache always holds at least one session.
fn cache_size_from(env_value: Option<&str>, configured: usize) -> usize {
    let fallback = configured.max(1);

    let Some(raw) = env_value else {
        return fallback;
    };

    match raw.trim().parse::<usize>() {
        Ok(size) if size > 0 => size,
        _ => {
            tracing::warn!(
                value = raw,
                fallback,
                "Ignoring invalid {CACHE_SIZE_ENV}"
            );
            fallback
        }
    }
}
