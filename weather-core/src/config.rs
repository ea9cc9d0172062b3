use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::provider::openweather::DEFAULT_BASE_URL;

const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_ADDR: &str = "api.openweathermap.org:443";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override for the OpenWeather endpoint, mostly useful against a local mock.
    pub base_url: Option<String>,

    pub timeout_secs: Option<u64>,

    /// Directory holding the key-value files; defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,

    /// `host:port` dialled to decide whether we are online.
    pub probe_addr: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for persisted favourites, recent searches and unit preference.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_from(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_from(&self, env: Option<String>) -> Option<String> {
        env.into_iter()
            .chain(self.api_key.clone())
            .find(|k| !k.trim().is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn probe_addr(&self) -> &str {
        self.probe_addr.as_deref().unwrap_or(DEFAULT_PROBE_ADDR)
    }
}
