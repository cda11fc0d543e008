//! Application configuration management.
//!
//! Configuration is stored at `~/.config/recipe-finder/config.json`. Every
//! field has a default so a missing file is not an error. The API key and
//! asset origin can also come from the environment (or a `.env` file).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_API_BASE_URL, DEFAULT_API_HOST};
use crate::offline::{Manifest, CACHE_VERSION, DEFAULT_ASSETS};

/// Application name used for config/data/cache directory paths
const APP_NAME: &str = "recipe-finder";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable holding the RapidAPI key
pub const ENV_API_KEY: &str = "RECIPE_FINDER_API_KEY";

/// Environment variable overriding where offline assets are fetched from
pub const ENV_ASSET_ORIGIN: &str = "RECIPE_FINDER_ASSET_ORIGIN";

const DEFAULT_ASSET_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_host: String,
    pub api_base_url: String,
    /// Origin the offline asset manifest is fetched from
    pub asset_origin: String,
    pub cache_version: String,
    /// Asset paths cached at install
    pub manifest: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: DEFAULT_API_HOST.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            asset_origin: DEFAULT_ASSET_ORIGIN.to_string(),
            cache_version: CACHE_VERSION.to_string(),
            manifest: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
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

    /// Apply overrides from `lookup` (normally the process environment).
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(origin) = non_empty(ENV_ASSET_ORIGIN) {
            self.asset_origin = origin;
        }
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::new(&self.cache_version, self.manifest.clone())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where favorites, the theme and the offline caches live
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn offline_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("offline"))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join("logs"))
    }
}
