use crate::errors::{AppError, AppResult};
use crate::utils::path::resolve_in;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable overriding the configuration directory.
pub const HOME_ENV: &str = "RANGELOG_HOME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: String,
    pub fallback_file: String,
    /// Runtime sync endpoint; ignored when one is fixed at build time.
    pub sync_url: Option<String>,
    /// Stable identifier of this device, generated on first use.
    pub device_id: Option<String>,
    pub list_limit: usize,
    pub sync_timeout_secs: u64,
}

fn default_list_limit() -> usize {
    50
}
fn default_sync_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "rangelog.sqlite".to_string(),
            fallback_file: "rangelog-fallback.json".to_string(),
            sync_url: None,
            device_id: None,
            list_limit: default_list_limit(),
            sync_timeout_secs: default_sync_timeout(),
        }
    }
}

impl Config {
    /// Return the configuration directory (`$RANGELOG_HOME` or `~/.rangelog`)
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var(HOME_ENV)
            && !dir.trim().is_empty()
        {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rangelog")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rangelog.conf")
    }

    /// Marker file registering a deferred background sync request
    pub fn background_marker() -> PathBuf {
        Self::config_dir().join("sync.request")
    }

    /// Full path of the primary SQLite database
    pub fn database_path(&self) -> PathBuf {
        resolve_in(&Self::config_dir(), &self.database)
    }

    /// Full path of the fallback JSON blob
    pub fn fallback_path(&self) -> PathBuf {
        resolve_in(&Self::config_dir(), &self.fallback_file)
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Persist the configuration, creating the directory if needed
    pub fn save(&self) -> AppResult<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;
        let yaml = serde_yaml::to_string(self)?;
        fs::write(Self::config_file(), yaml)?;
        Ok(())
    }

    /// Return the device id, generating and persisting one on first use.
    pub fn ensure_device_id(&mut self) -> AppResult<String> {
        if let Some(id) = &self.device_id
            && !id.trim().is_empty()
        {
            return Ok(id.clone());
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.device_id = Some(id.clone());
        self.save()?;
        debug!(device_id = %id, "generated device id");
        Ok(id)
    }
}
