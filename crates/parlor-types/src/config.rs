//! Global configuration types for Parlor.
//!
//! `GlobalConfig` represents the optional `config.toml` in the data directory.

use serde::{Deserialize, Serialize};

/// Number of sessions the cache holds when nothing else is configured.
pub const DEFAULT_CACHE_SIZE: usize = 100;

/// Top-level configuration for the Parlor service.
///
/// Loaded from `~/.parlor/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Maximum number of sessions held by the LRU session cache.
    #[serde(default = "default_session_cache_size")]
    pub session_cache_size: usize,
}

fn default_session_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            session_cache_size: default_session_cache_size(),
        }
    }
}
