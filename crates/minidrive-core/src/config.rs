//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! service address, where downloads go, which credential store to use and
//! the last username that signed in.
//!
//! Configuration is stored at `~/.config/minidrive/config.json`. The
//! `MINIDRIVE_API_BASE` and `MINIDRIVE_DOWNLOAD_DIR` environment variables
//! override the file for the current run only.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{FileTokenStore, KeyringTokenStore, Session, TokenStore};

/// Application name used for config/cache/data directory paths
const APP_NAME: &str = "minidrive";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// File token store name in the local data directory
const STORAGE_FILE: &str = "storage.json";

const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// 30s allows for slow uploads of small files while still failing eventually.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_API_BASE: &str = "MINIDRIVE_API_BASE";
const ENV_DOWNLOAD_DIR: &str = "MINIDRIVE_DOWNLOAD_DIR";

/// Where the bearer token is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub download_dir: Option<PathBuf>,
    pub credential_backend: CredentialBackend,
    pub request_timeout_secs: u64,
    pub last_username: Option<String>,

    /// File values hidden by environment overrides, written back on save.
    #[serde(skip)]
    shadowed: Shadowed,

    /// File this config was loaded from; `save` writes back to it.
    #[serde(skip)]
    source: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
struct Shadowed {
    api_base: Option<String>,
    download_dir: Option<Option<PathBuf>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            download_dir: None,
            credential_backend: CredentialBackend::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_username: None,
            shadowed: Shadowed::default(),
            source: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults if absent), then apply environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit file. Later saves go back to the same file.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    fn load_with(path: &Path, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config: Self = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.source = Some(path.to_path_buf());
        config.apply_env(var);
        debug!(api_base = %config.api_base, "Config loaded");
        Ok(config)
    }

    /// Persist the config. Environment overrides are not written.
    pub fn save(&self) -> Result<()> {
        match self.source {
            Some(ref path) => self.save_to(path),
            None => self.save_to(&Self::config_path()?),
        }
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.file_values())?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// This config as it should appear on disk.
    fn file_values(&self) -> Self {
        let mut config = self.clone();
        if let Some(api_base) = config.shadowed.api_base.take() {
            config.api_base = api_base;
        }
        if let Some(download_dir) = config.shadowed.download_dir.take() {
            config.download_dir = download_dir;
        }
        config
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(base) = var(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            let previous = std::mem::replace(&mut self.api_base, base.trim().to_string());
            self.shadowed.api_base.get_or_insert(previous);
        }
        if let Some(dir) = var(ENV_DOWNLOAD_DIR).filter(|v| !v.trim().is_empty()) {
            let previous = self.download_dir.replace(PathBuf::from(dir));
            self.shadowed.download_dir.get_or_insert(previous);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Directory downloads are saved into.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("./downloads"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Build the configured token store.
    pub fn token_store(&self) -> Result<Box<dyn TokenStore>> {
        match self.credential_backend {
            CredentialBackend::File => {
                let data_dir = dirs::data_local_dir()
                    .ok_or_else(|| anyhow::anyhow!("Could not find local data directory"))?;
                Ok(Box::new(FileTokenStore::new(
                    data_dir.join(APP_NAME).join(STORAGE_FILE),
                )))
            }
            CredentialBackend::Keyring => Ok(Box::new(KeyringTokenStore)),
        }
    }

    /// Open the session over the configured token store.
    pub fn open_session(&self) -> Result<Session> {
        Session::open(self.token_store()?)
    }
}
