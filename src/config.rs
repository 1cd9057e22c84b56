use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "PODCAST_SUMMARIZER_API_URL";

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the summarization backend, without trailing slash.
    pub api_base_url: String,
    pub poll_interval_secs: u64,
    pub validation_debounce_ms: u64,
    /// Initial slider position, 0.0 (concise) to 1.0 (detailed).
    pub default_detail_level: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            poll_interval_secs: crate::poller::DEFAULT_POLL_INTERVAL.as_secs(),
            validation_debounce_ms: crate::validation::DEFAULT_DEBOUNCE.as_millis() as u64,
            default_detail_level: crate::form::DEFAULT_DETAIL_LEVEL,
        }
    }
}

impl Config {
    /// Directory: ~/.config/podcast-summarizer/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("podcast-summarizer");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid,
    /// then apply environment overrides. A missing file is created with the
    /// defaults so it can be edited.
    pub fn load() -> Self {
        let config = match fs::read_to_string(Self::path()) {
            Ok(data) => Self::from_json(&data),
            Err(_) => {
                let config = Self::default();
                if let Err(e) = config.save() {
                    log::warn!("Failed to write default config: {e}");
                }
                config
            }
        };
        config.with_env_override(std::env::var(API_URL_ENV).ok())
    }

    fn from_json(data: &str) -> Self {
        serde_json::from_str(data).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config file: {e}");
            Self::default()
        })
    }

    fn with_env_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            log::info!("Using API URL from {API_URL_ENV}: {url}");
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn validation_debounce(&self) -> Duration {
        Duration::from_millis(self.validation_debounce_ms)
    }
}
