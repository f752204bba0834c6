//! Service configuration.
//!
//! ```toml
//! bind = "127.0.0.1:8000"
//! database = "data/recipes.db"
//! cors_any = false
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "ANVIL_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "anvil.toml";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Listen address.
    pub bind: String,
    /// SQLite file holding saved recipes.
    pub database: PathBuf,
    /// Allow any origin, method and header.
    pub cors_any: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind: "0.0.0.0:8000".to_string(),
            database: PathBuf::from("data/recipes.db"),
            cors_any: true,
        }
    }
}

impl ApiConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: ApiConfig = toml::from_str(s)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load from `$ANVIL_CONFIG` if set, else `anvil.toml` if present,
    /// else defaults.
    pub fn locate() -> Result<Self, ConfigError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::load(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("bind address is empty".to_string()));
        }
        if self.database.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database path is empty".to_string()));
        }
        Ok(())
    }
}
