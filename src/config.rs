//! Engine configuration loaded from TOML.
//!
//! ```toml
//! owner = "0xowner"
//! scenario = "maps/five.json"
//!
//! [settings]
//! rally_time = 14400
//! owner_fee_percent = 3
//! ```
//!
//! Every key is optional; missing settings fall back to their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{Address, GameSettings};

/// Owner address used when the config does not name one.
pub const DEFAULT_OWNER: &str = "owner";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Settings(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address allowed to run setup and collect the owner fee.
    pub owner: Address,
    pub settings: GameSettings,
    /// JSON scenario applied at startup.
    pub scenario: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            owner: Address::from(DEFAULT_OWNER),
            settings: GameSettings::default(),
            scenario: None,
        }
    }
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml(contents: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.settings.validate().map_err(ConfigError::Settings)?;
        Ok(config)
    }

    /// Reads a config file. A relative `scenario` path is resolved against
    /// the config file's directory.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Config::from_toml(&contents)?;
        if let (Some(scenario), Some(dir)) = (&config.scenario, path.parent()) {
            if scenario.is_relative() {
                config.scenario = Some(dir.join(scenario));
            }
        }
        tracing::debug!(?path, owner = %config.owner, "config loaded");
        Ok(config)
    }
}
