use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::api::{Platform, Summary};

/// Most entries kept on disk; older ones are dropped first.
const MAX_ENTRIES: usize = 200;

/// A completed summary with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub title: String,
    pub source_url: String,
    pub platform: Platform,
    #[serde(default)]
    pub channel: Option<String>,
    pub summary: String,
    pub timestamp: String,
}

/// Persistent list of past summaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub entries: Vec<SummaryRecord>,
}

impl History {
    /// Directory: ~/.local/share/podcast-summarizer/
    fn dir() -> PathBuf {
        let mut p = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("podcast-summarizer");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("history.json")
    }

    /// Load from disk, returning defaults if missing.
    pub fn load() -> Self {
        match fs::read_to_string(Self::path()) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }

    /// Record a finished summary.
    pub fn record(&mut self, summary: &Summary, source_url: &str, platform: Platform) {
        self.entries.push(SummaryRecord {
            title: summary.title.clone(),
            source_url: source_url.to_string(),
            platform,
            channel: summary.channel.clone(),
            summary: summary.content.clone(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
    }
}
