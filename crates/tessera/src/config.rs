use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cid_log::{DEFAULT_LOG_CAPACITY, DEFAULT_LOG_KEY};
use crate::types::SemVer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsConfig {
    /// Format version stamped into newly created nodes
    #[serde(default)]
    pub version: SemVer,
    /// Name of the key-store key protecting the root.
    ///  Unset means a public file system
    #[serde(default)]
    pub key_name: Option<String>,
    /// Key the root history log is kept under
    #[serde(default = "default_log_key")]
    pub log_key: String,
    /// Number of roots the history log retains
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

fn default_log_key() -> String {
    DEFAULT_LOG_KEY.to_string()
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            version: SemVer::default(),
            key_name: None,
            log_key: default_log_key(),
            log_capacity: default_log_capacity(),
        }
    }
}

impl FsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: FsConfig = toml::from_str(s)?;
        if config.log_capacity == 0 {
            return Err(ConfigError::Invalid("log_capacity must be at least 1".into()));
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read a config file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&raw)
    }

    pub fn is_private(&self) -> bool {
        self.key_name.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
