use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::record::DEFAULT_ID_PREFIX_LEN;

pub const DEFAULT_STORAGE_KEY: &str = "interview-state-v1";
pub const DEFAULT_MAX_RECORDS: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Session store and transport settings, read from TOML. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub storage_key: String,
    pub max_records: usize,
    pub id_prefix_len: usize,
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub storage_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_records: DEFAULT_MAX_RECORDS,
            id_prefix_len: DEFAULT_ID_PREFIX_LEN,
            base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_dir: None,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
