use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::message::MAX_ATTACHMENT_PREVIEW_SIZE;

pub const DEFAULT_FOLLOW_HELP_URL: &str = "https://keybase.io/docs/tracking";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub max_attachment_preview: f64,
    pub follow_help_url: String,
    /// Shown in tracker fields the engine does not supply yet.
    pub placeholder_text: String,
    pub diagnostics_dir: Option<PathBuf>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            max_attachment_preview: MAX_ATTACHMENT_PREVIEW_SIZE,
            follow_help_url: DEFAULT_FOLLOW_HELP_URL.to_string(),
            placeholder_text: String::new(),
            diagnostics_dir: None,
        }
    }
}

impl ViewConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, CoreError> {
        let config: ViewConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if !self.max_attachment_preview.is_finite() || self.max_attachment_preview <= 0.0 {
            return Err(CoreError::InvalidArgument(
                "max_attachment_preview must be positive".to_string(),
            ));
        }
        if self.follow_help_url.trim().is_empty() {
            return Err(CoreError::InvalidArgument("follow_help_url is empty".to_string()));
        }
        Ok(())
    }
}
