//! Configuration loading.
//!
//! Handles parsing of `rjournal.toml`. HTTP address and port are left to
//! Rocket's own configuration.

use serde::{Deserialize, Serialize};

use std::path::{Path, PathBuf};

use crate::internal_error::{InternalError, InternalResult};
use crate::period::Zone;

pub const CONFIG_ENV_VAR: &str = "RJOURNAL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "rjournal.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Zone used to decide which calendar day a timestamp falls on
    /// (`local`, `Z`, or `±HH:MM`)
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            utc_offset: default_utc_offset(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("rjournal.db")
}

fn default_utc_offset() -> String {
    "local".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> InternalResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or return defaults when it does not exist
    pub fn load_or_default(path: &Path) -> InternalResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Config path named by `RJOURNAL_CONFIG`, falling back to `rjournal.toml`
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn save(&self, path: &Path) -> InternalResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn zone(&self) -> InternalResult<Zone> {
        self.utc_offset.parse()
    }

    fn validate(&self) -> InternalResult<()> {
        if self.database.as_os_str().is_empty() {
            return Err(InternalError::InvalidConfig(
                "database cannot be empty".to_string(),
            ));
        }
        self.zone().map_err(|e| InternalError::InvalidConfig(format!("utc_offset: {e}")))?;
        Ok(())
    }
}
