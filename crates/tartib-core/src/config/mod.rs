//! Configuration management for the Tartib tools.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `tartib.toml` file
//! 3. User config `~/.config/tartib/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage locations.
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./tartib.toml` (project local)
    /// 2. `~/.config/tartib/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("tartib.toml").exists() {
            return Self::from_file("tartib.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tartib").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("TARTIB_DATA_DIR") {
            self.storage.data_dir = dir;
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root data directory.
    pub data_dir: String,

    /// Database subdirectory within the data dir.
    pub database_dir: String,

    /// Assets subdirectory within the data dir.
    pub assets_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_dir: DEFAULT_DATABASE_DIR.to_string(),
            assets_dir: DEFAULT_ASSETS_DIR.to_string(),
        }
    }
}

impl StorageConfig {
    /// Path to the embedded database directory.
    pub fn database_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.database_dir)
    }

    /// Path to the assets directory.
    pub fn assets_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.assets_dir)
    }
}
