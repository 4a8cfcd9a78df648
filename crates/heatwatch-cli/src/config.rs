//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use heatwatch_core::MonitorConfig;
use heatwatch_core::http::{HttpGeocoder, HttpReadingProvider};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Place used when no `--city` or coordinates are given
    #[serde(default)]
    pub default_city: Option<String>,

    /// Upstream endpoints and credentials
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Pipeline settings
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Upstream endpoints and credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Station feed API token
    #[serde(default)]
    pub token: Option<String>,

    /// Station feed base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Place-name search URL
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
}

fn default_base_url() -> String {
    HttpReadingProvider::DEFAULT_URL.to_string()
}

fn default_geocoding_url() -> String {
    HttpGeocoder::DEFAULT_URL.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
            geocoding_url: default_geocoding_url(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("heatwatch")
            .join("config.toml")
    }

    /// Load config from the default path, or return default if not found
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::path())
    }

    /// Load config from `path`, or return default if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config
            .monitor
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Save config to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Resolve the token: command line or environment first, then config.
pub fn resolve_token(arg: Option<String>, config: &Config) -> Option<String> {
    arg.or_else(|| config.provider.token.clone())
        .filter(|t| !t.trim().is_empty())
}

/// Resolve the place name: command line first, then config.
pub fn resolve_city(arg: Option<String>, config: &Config) -> Option<String> {
    arg.or_else(|| config.default_city.clone())
}
