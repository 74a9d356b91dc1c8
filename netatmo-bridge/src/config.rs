//! Bridge configuration: where records live and how long the cache holds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::measures::DEFAULT_CACHE_TTL;

/// Configuration for one bridge run.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Directory holding the settings, token and measurement records.
    pub data_dir: PathBuf,

    /// Maximum age of the measurement cache before a fresh fetch.
    pub cache_ttl: Duration,

    /// Credentials file name.
    pub settings_file: String,

    /// Token record file name.
    pub token_file: String,

    /// Measurement cache file name.
    pub measures_file: String,
}

impl BridgeConfig {
    /// Create a configuration rooted at the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Path of the credentials file.
    pub fn settings_path(&self) -> PathBuf {
        self.resolve(&self.settings_file)
    }

    /// Path of the token record.
    pub fn token_path(&self) -> PathBuf {
        self.resolve(&self.token_file)
    }

    /// Path of the measurement cache.
    pub fn measures_path(&self) -> PathBuf {
        self.resolve(&self.measures_file)
    }

    fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        self.data_dir.join(name)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            cache_ttl: DEFAULT_CACHE_TTL,
            settings_file: "netatmo_settings.json".to_string(),
            token_file: "token.json".to_string(),
            measures_file: "measures.json".to_string(),
        }
    }
}
