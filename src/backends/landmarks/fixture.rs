// SPDX-License-Identifier: MPL-2.0

//! Landmark provider backed by fixed keypoints
//!
//! Replays the same faces for every frame. Used by the command line tool
//! (keypoints from a JSON file) and by tests.

use super::{LandmarkProvider, LandmarkSet};
use crate::errors::DetectorError;
use image::RgbaImage;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkFile {
    Single(LandmarkSet),
    Multiple(Vec<LandmarkSet>),
}

/// Detector that returns the same faces every time
#[derive(Debug, Clone, Default)]
pub struct StaticLandmarks {
    faces: Vec<LandmarkSet>,
    warmup_failures: usize,
    calls: usize,
}

impl StaticLandmarks {
    pub fn new(faces: Vec<LandmarkSet>) -> Self {
        Self {
            faces: faces.into_iter().filter(|f| !f.is_empty()).collect(),
            warmup_failures: 0,
            calls: 0,
        }
    }

    /// Detector that never finds a face
    pub fn no_face() -> Self {
        Self::default()
    }

    /// Fail the first `count` detections, like a model that is still warming up
    pub fn with_warmup_failures(mut self, count: usize) -> Self {
        self.warmup_failures = count;
        self
    }

    /// Parse keypoints: an array of points (one face) or an array of faces
    pub fn from_json(text: &str) -> Result<Self, DetectorError> {
        let file: LandmarkFile = serde_json::from_str(text)
            .map_err(|e| DetectorError::LoadFailed(format!("invalid landmark file: {}", e)))?;
        Ok(match file {
            LandmarkFile::Single(face) => Self::new(vec![face]),
            LandmarkFile::Multiple(faces) => Self::new(faces),
        })
    }

    /// Read keypoints from a JSON file
    pub async fn load(path: &Path) -> Result<Self, DetectorError> {
        info!(path = %path.display(), "Loading landmark fixture");
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DetectorError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let provider = Self::from_json(&text)?;
        debug!(faces = provider.faces.len(), "Landmark fixture loaded");
        Ok(provider)
    }

    /// Number of detection passes requested so far
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl LandmarkProvider for StaticLandmarks {
    fn detect(
        &mut self,
        _frame: &RgbaImage,
        timestamp_ms: f64,
    ) -> Result<Vec<LandmarkSet>, DetectorError> {
        self.calls += 1;
        if self.calls <= self.warmup_failures {
            return Err(DetectorError::DetectionFailed(format!(
                "model warming up at {:.1} ms",
                timestamp_ms
            )));
        }
        Ok(self.faces.clone())
    }
}
