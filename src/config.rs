use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/backend.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gốc HTTP của nền tảng cloud.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Môi trường (env) chứa các collection và cloud function.
    #[serde(default = "default_env_id")]
    pub env_id: String,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_env_id() -> String {
    "qqk-dev".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            env_id: default_env_id(),
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config("config/does-not-exist.json");
        assert_eq!(config.api_base_url, "http://127.0.0.1:8080");
        assert_eq!(config.env_id, "qqk-dev");
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"api_base_url": "https://api.example.com"}"#).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.env_id, "qqk-dev");
    }
}
