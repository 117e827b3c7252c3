//! Application configuration management.
//!
//! Configuration names where the site's data lives (a base URL or a local
//! directory), how long loaded datasets stay fresh, and optionally a custom
//! access key digest.
//!
//! Configuration is stored at `~/.config/classlog/config.json` and can be
//! overridden with `CLASSLOG_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::DEFAULT_EXPIRE_HOURS;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "classlog";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_BASE_URL: &str = "CLASSLOG_BASE_URL";
pub const ENV_DATA_DIR: &str = "CLASSLOG_DATA_DIR";
pub const ENV_CACHE_TTL_HOURS: &str = "CLASSLOG_CACHE_TTL_HOURS";
pub const ENV_ACCESS_KEY_HASH: &str = "CLASSLOG_ACCESS_KEY_HASH";

fn default_cache_ttl_hours() -> i64 {
    DEFAULT_EXPIRE_HOURS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: i64,
    /// Hex SHA-256 of the access key.
    #[serde(default)]
    pub access_key_hash: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            data_dir: None,
            cache_ttl_hours: DEFAULT_EXPIRE_HOURS,
            access_key_hash: None,
        }
    }
}

/// Where the dataset files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    Dir(PathBuf),
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
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

    /// Apply `CLASSLOG_*` variables from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(hours) = lookup(ENV_CACHE_TTL_HOURS) {
            match hours.trim().parse::<i64>() {
                Ok(hours) if hours >= 0 => self.cache_ttl_hours = hours,
                _ => warn!(value = %hours, "Ignoring invalid {}", ENV_CACHE_TTL_HOURS),
            }
        }
        if let Some(hash) = lookup(ENV_ACCESS_KEY_HASH).filter(|v| !v.is_empty()) {
            self.access_key_hash = Some(hash);
        }
    }

    pub fn cache_expire(&self) -> Duration {
        Duration::hours(self.cache_ttl_hours.max(0))
    }

    /// A local directory wins over a URL when both are set.
    pub fn data_source(&self) -> Result<DataSource> {
        if let Some(ref dir) = self.data_dir {
            return Ok(DataSource::Dir(dir.clone()));
        }
        if let Some(ref url) = self.base_url {
            return Ok(DataSource::Url(url.clone()));
        }
        Err(anyhow::anyhow!(
            "No data source configured: set {} or {}",
            ENV_BASE_URL,
            ENV_DATA_DIR
        ))
    }
}
