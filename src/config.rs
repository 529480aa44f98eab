// SPDX-License-Identifier: MPL-2.0

//! Persistent user preferences
//!
//! Stored as JSON under the platform config directory. A missing file means
//! defaults; a malformed file is reported and replaced by defaults so the
//! booth always starts.

use crate::constants::{DEFAULT_RENDER_INTERVAL_MS, DOWNLOAD_PREFIX};
use crate::errors::{AppError, AppResult};
use crate::pipelines::effects::{BeautyIntensity, FaceEffect};
use crate::pipelines::filters::FilterType;
use crate::pipelines::photo::AspectRatio;
use crate::session::{PhotoMode, StripCount};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Single photos or photo strips
    pub photo_mode: PhotoMode,
    /// Photos per strip (3 or 4)
    pub photos_per_strip: StripCount,
    /// Active filter
    pub filter: FilterType,
    /// Crop ratio for captured photos
    pub aspect_ratio: AspectRatio,
    /// Active face effect
    pub face_effect: FaceEffect,
    /// Skin smoothing intensity (0-100)
    pub beauty_intensity: BeautyIntensity,
    /// Mirror camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Where exported photos and strips are written
    pub output_dir: Option<PathBuf>,
    /// Render loop period in milliseconds
    pub render_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            photo_mode: PhotoMode::Strip,
            photos_per_strip: StripCount::Four,
            filter: FilterType::Normal,
            aspect_ratio: AspectRatio::Square,
            face_effect: FaceEffect::None,
            beauty_intensity: BeautyIntensity::default(),
            mirror_preview: true, // Default to mirrored (selfie mode)
            output_dir: None,
            render_interval_ms: DEFAULT_RENDER_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(DOWNLOAD_PREFIX).join(CONFIG_FILE))
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from `path`; `Ok(None)` when the file does not exist
    pub fn load(path: &Path) -> AppResult<Option<Self>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let config = serde_json::from_str(&text)?;
        Ok(Some(config))
    }

    /// Write configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Directory for exports: configured, else `<Pictures>/photobooth`
    pub fn resolved_output_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = &self.output_dir {
            return Ok(dir.clone());
        }
        dirs::picture_dir()
            .or_else(dirs::home_dir)
            .map(|dir| dir.join(DOWNLOAD_PREFIX))
            .ok_or_else(|| AppError::Config("No pictures or home directory available".into()))
    }
}
