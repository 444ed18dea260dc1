use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Base URL of the authoritative content backend. Remote mode is enabled
    /// only when both this and `remote_api_key` are present.
    pub remote_url: Option<String>,
    pub remote_api_key: Option<String>,

    /// API key for the translation provider. Without it, translation is
    /// disabled and articles are served in whichever language they carry.
    pub translator_api_key: Option<String>,

    #[serde(default = "default_list_limit")]
    pub default_list_limit: usize,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sangbad");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("cache.db").to_string_lossy().to_string()
}

fn default_list_limit() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            remote_url: None,
            remote_api_key: None,
            translator_api_key: None,
            default_list_limit: default_list_limit(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sangbad")
            .join("config.toml")
    }

    /// Remote mode requires both the endpoint and the credential. Decided
    /// once at startup; the repository never re-checks configuration.
    pub fn remote_configured(&self) -> bool {
        matches!((&self.remote_url, &self.remote_api_key), (Some(url), Some(key))
            if !url.is_empty() && !key.is_empty())
    }
}
