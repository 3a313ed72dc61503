pub mod i18n;
pub mod records;
pub mod run;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use interview_session::{
    FileStorage, HttpTransport, InterviewStateStore, SessionConfig, default_storage_dir,
};

/// Flags that override the session configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Base URL for relative update URLs
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,
    /// Directory holding saved interview records
    #[arg(long = "storage-dir", value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,
}

/// Loads the config file, if any, then applies the command-line overrides.
pub fn load_config(path: Option<&Path>, overrides: &SessionArgs) -> Result<SessionConfig> {
    let mut config = match path {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(base_url) = &overrides.base_url {
        config.base_url = Some(base_url.clone());
    }
    if let Some(dir) = &overrides.storage_dir {
        config.storage_dir = Some(dir.clone());
    }
    Ok(config)
}

/// Opens the file-backed store with the HTTP transport.
pub fn open_store(config: &SessionConfig) -> Result<InterviewStateStore> {
    let dir = match &config.storage_dir {
        Some(dir) => dir.clone(),
        None => default_storage_dir()
            .context("no data directory available; pass --storage-dir")?,
    };
    debug!(dir = %dir.display(), "opening interview storage");
    let storage = Arc::new(FileStorage::new(dir));
    let transport = Arc::new(HttpTransport::new(config)?);
    Ok(InterviewStateStore::with_config(config, storage, transport))
}

/// Reads a JSON document from a file, or from stdin for `-`.
pub fn read_json_input<T: serde::de::DeserializeOwned>(source: &str) -> Result<T> {
    let raw = if source == "-" {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))?
    };
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {source}"))
}
