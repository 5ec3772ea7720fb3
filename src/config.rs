use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE, GeminiSettings};

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
    pub default_format: Option<String>,
}

impl Config {
    /// Load config from ~/.config/ytgist/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Generation settings; explicit overrides win over file values.
    pub fn gemini_settings(&self, model: Option<&str>, temperature: Option<f32>) -> GeminiSettings {
        GeminiSettings {
            api_key: env_api_key().or_else(|| self.api_key.clone()),
            model: model
                .map(str::to_string)
                .or_else(|| self.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: temperature.or(self.temperature).unwrap_or(DEFAULT_TEMPERATURE),
            base_url: self.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

fn env_api_key() -> Option<String> {
    API_KEY_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytgist")
        .join("config.toml")
}
