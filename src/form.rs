use thiserror::Error;

use crate::api::{Platform, SummarizeRequest};

pub const DEFAULT_DETAIL_LEVEL: f64 = 0.5;
pub const DETAIL_STEP: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please enter a source URL")]
    MissingUrl,
    #[error("Please wait for the URL to validate")]
    UnvalidatedUrl,
    #[error("Please enter the episode name")]
    MissingEpisode,
    #[error("Detail level must be between 0 and 1")]
    DetailOutOfRange,
}

/// Source-selection form.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceForm {
    pub platform: Platform,
    pub url: String,
    pub episode_name: String,
    pub detail_level: f64,
    pub url_valid: bool,
    default_detail: f64,
}

impl Default for SourceForm {
    fn default() -> Self {
        Self::new(DEFAULT_DETAIL_LEVEL)
    }
}

impl SourceForm {
    pub fn new(default_detail: f64) -> Self {
        let default_detail = default_detail.clamp(0.0, 1.0);
        Self {
            platform: Platform::Youtube,
            url: String::new(),
            episode_name: String::new(),
            detail_level: default_detail,
            url_valid: false,
            default_detail,
        }
    }

    /// Switching source clears everything typed so far.
    pub fn set_platform(&mut self, platform: Platform) {
        if self.platform != platform {
            self.reset();
            self.platform = platform;
        }
    }

    /// A new URL invalidates any earlier validation.
    pub fn set_url(&mut self, url: &str) {
        if self.url != url {
            self.url = url.to_string();
            self.url_valid = false;
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            platform: self.platform,
            ..Self::new(self.default_detail)
        };
    }

    pub fn detail_label(&self) -> &'static str {
        detail_label(self.detail_level)
    }

    /// Build the job payload, or say which required field is missing.
    pub fn submission(&self) -> Result<SummarizeRequest, FormError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(FormError::MissingUrl);
        }
        if !self.url_valid {
            return Err(FormError::UnvalidatedUrl);
        }
        if !(0.0..=1.0).contains(&self.detail_level) {
            return Err(FormError::DetailOutOfRange);
        }

        let episode_name = match self.platform {
            Platform::Youtube => None,
            Platform::Rss => {
                let name = self.episode_name.trim();
                if name.is_empty() {
                    return Err(FormError::MissingEpisode);
                }
                Some(name.to_string())
            }
        };

        Ok(SummarizeRequest {
            source_url: url.to_string(),
            episode_name,
            detail_level: self.detail_level,
            platform: self.platform,
        })
    }
}

pub fn detail_label(level: f64) -> &'static str {
    if level < 0.33 {
        "Concise"
    } else if level < 0.66 {
        "Balanced"
    } else {
        "Detailed"
    }
}

/// Snap a slider value onto the 0.25 grid within 0..=1.
pub fn snap_detail(level: f64) -> f64 {
    ((level / DETAIL_STEP).round() * DETAIL_STEP).clamp(0.0, 1.0)
}
