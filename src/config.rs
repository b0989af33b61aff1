//! Configuration loaded from `~/.jobdeck/config.json`.
//!
//! Every field has a default, so a missing file just runs against the local
//! tracker. `JOBDECK_API_URL` overrides the base origin for development.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base origin of the tracker API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Minutes between automatic dashboard refreshes.
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u64,
    /// Default score filter for the job-matches list.
    #[serde(default = "default_min_score")]
    pub min_score: u32,
}

fn default_api_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_refresh_minutes() -> u64 {
    15
}

fn default_min_score() -> u32 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            refresh_minutes: default_refresh_minutes(),
            min_score: default_min_score(),
        }
    }
}

/// Canonical config file path (`~/.jobdeck/config.json`).
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".jobdeck").join("config.json"))
}

impl Config {
    /// Load configuration from disk, falling back to defaults when the file
    /// is absent, then apply environment overrides.
    pub fn load() -> Result<Self, String> {
        let path = config_path()?;

        let mut config = if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|e| format!("Failed to read config: {}", e))?;
            serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("JOBDECK_API_URL") {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8081");
        assert_eq!(config.refresh_minutes, 15);
        assert_eq!(config.min_score, 60);
    }

    #[test]
    fn test_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"api_base_url": "http://tracker.lan:9000", "min_score": 75}"#)
                .unwrap();
        assert_eq!(config.api_base_url, "http://tracker.lan:9000");
        assert_eq!(config.refresh_minutes, 15);
        assert_eq!(config.min_score, 75);
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api_base_url, config.api_base_url);
        assert_eq!(parsed.refresh_minutes, config.refresh_minutes);
    }
}
