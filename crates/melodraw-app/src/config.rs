//! Application configuration.

use melodraw_core::RedoPolicy;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Session configuration, loadable from JSON. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    /// Canvas width in logical pixels.
    pub width: u32,
    /// Canvas height in logical pixels.
    pub height: u32,
    /// Canvas background as RGBA8.
    pub background: [u8; 4],
    /// Directory holding the instrument clips. No audio when unset.
    pub sound_dir: Option<PathBuf>,
    /// Fixed color seed for reproducible sessions.
    pub seed: Option<u64>,
    /// Resolution multiplier for shared snapshots.
    pub snapshot_scale: f64,
    pub redo_policy: RedoPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Melodraw".to_string(),
            width: 390,
            height: 844,
            background: [255, 255, 255, 255],
            sound_dir: None,
            seed: None,
            snapshot_scale: 2.0,
            redo_policy: RedoPolicy::Keep,
        }
    }
}

impl AppConfig {
    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn background_color(&self) -> Color {
        let [r, g, b, a] = self.background;
        Color::from_rgba8(r, g, b, a)
    }

    pub fn canvas_size(&self) -> kurbo::Size {
        kurbo::Size::new(self.width as f64, self.height as f64)
    }
}
