use super::currency::SnapshotDate;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_PRIMARY_URL: &str = "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@{date}";
pub const DEFAULT_FALLBACK_URL: &str = "https://{date}.currency-api.pages.dev";

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_date() -> String {
    "latest".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_base() -> String {
    "EUR".to_string()
}

fn default_target() -> String {
    "USD".to_string()
}

/// Mirrors of the currency-api dataset. URL templates may contain `{date}`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CurrencyApiConfig {
    pub primary_url: String,
    pub fallback_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_date")]
    pub date: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CurrencyApiConfig {
    fn default() -> Self {
        CurrencyApiConfig {
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            api_version: default_api_version(),
            date: default_date(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CurrencyApiConfig {
    pub fn snapshot_date(&self) -> Result<SnapshotDate> {
        self.date
            .parse()
            .with_context(|| format!("Invalid date in provider config: {}", self.date))
    }

    /// Per-attempt request timeout; never unbounded.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub currency_api: CurrencyApiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_base")]
    pub default_base: String,
    #[serde(default = "default_target")]
    pub default_target: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            default_base: default_base(),
            default_target: default_target(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
