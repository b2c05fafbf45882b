use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::ui::Layout;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub daemon_url: Option<String>,
    pub layout: Option<Layout>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().context("Could not find config directory")?;
        path.push("keyview");
        path.push("config.toml");
        Ok(path)
    }

    /// Remember the daemon URL for the next session; returns true when
    /// the stored value changed
    pub fn remember_daemon(&mut self, url: &str) -> bool {
        if self.daemon_url.as_deref() == Some(url) {
            return false;
        }
        self.daemon_url = Some(url.to_string());
        true
    }
}
