//! Application configuration management.
//!
//! Loads persistent defaults (retention threshold, report length) from a
//! platform-specific JSON file. CLI flags override anything loaded here.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::coordinator::DEFAULT_MIN_RETAINED_SIZE;

fn default_min_retained_size() -> u64 {
    DEFAULT_MIN_RETAINED_SIZE
}

fn default_top_files() -> usize {
    10
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Minimum file size (bytes) retained in large-file scans.
    #[serde(default = "default_min_retained_size")]
    pub min_retained_size: u64,

    /// How many entries the report's directory and file sections each show.
    #[serde(default = "default_top_files")]
    pub top_files: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            min_retained_size: default_min_retained_size(),
            top_files: default_top_files(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from the default platform-specific path,
    /// falling back to defaults on any error.
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {e}");
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration to the default platform-specific path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "diskscout", "diskscout")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }
}
