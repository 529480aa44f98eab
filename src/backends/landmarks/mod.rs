// SPDX-License-Identifier: MPL-2.0

//! Face landmark detection collaborator
//!
//! A detector turns one frame into zero or more [`LandmarkSet`]s of
//! normalized keypoints. Which index means which part of the face is a
//! property of the detector's model, so it lives in a [`LandmarkLayout`]
//! table keyed by [`FaceRegion`]. Effect drawing only ever asks for regions.

pub mod fixture;

pub use fixture::StaticLandmarks;

use crate::errors::DetectorError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// One keypoint, coordinates relative to frame width/height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl NormalizedLandmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }

    /// Position in pixels on a `width` x `height` frame
    pub fn to_pixel(self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

/// Keypoints of one detected face, index-addressed by the detector's model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<NormalizedLandmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<NormalizedLandmark>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[NormalizedLandmark] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NormalizedLandmark> {
        self.points.get(index).copied()
    }

    /// First available keypoint for `region` under `layout`
    pub fn locate(&self, layout: &LandmarkLayout, region: FaceRegion) -> Option<NormalizedLandmark> {
        layout.indices(region).iter().find_map(|&i| self.get(i))
    }

    /// Normalized bounding box `(min_x, min_y, max_x, max_y)` over all points
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        ))
    }
}

/// Anatomical anchors used by face effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceRegion {
    LeftCheek,
    RightCheek,
    NoseTip,
    /// Point between nose and upper lip
    Subnasal,
    LeftNoseWing,
    NoseBridgeLower,
    NoseBridgeUpper,
    /// Between the eyes, falls back to the nose
    FaceCenter,
    Forehead,
}

/// Region to landmark index mapping for one detector model
///
/// Each region lists candidate indices in preference order; the first one
/// present in a set wins.
#[derive(Debug)]
pub struct LandmarkLayout {
    pub name: &'static str,
    pub regions: &'static [(FaceRegion, &'static [usize])],
}

impl LandmarkLayout {
    pub fn indices(&self, region: FaceRegion) -> &'static [usize] {
        self.regions
            .iter()
            .find(|(r, _)| *r == region)
            .map(|(_, indices)| *indices)
            .unwrap_or(&[])
    }
}

/// 468/478-point face mesh topology
pub static MEDIAPIPE_FACE_MESH: LandmarkLayout = LandmarkLayout {
    name: "mediapipe-face-mesh",
    regions: &[
        (FaceRegion::LeftCheek, &[234]),
        (FaceRegion::RightCheek, &[454]),
        (FaceRegion::NoseTip, &[4]),
        (FaceRegion::Subnasal, &[94]),
        (FaceRegion::LeftNoseWing, &[129]),
        (FaceRegion::NoseBridgeLower, &[197]),
        (FaceRegion::NoseBridgeUpper, &[6]),
        (FaceRegion::FaceCenter, &[168, 1]),
        (FaceRegion::Forehead, &[10, 151]),
    ],
};

/// A face landmark detector
///
/// Implementations must tolerate arbitrary timestamps and may fail while
/// warming up; callers treat any error as "no face this tick".
pub trait LandmarkProvider: Send {
    /// Index layout of the sets this detector returns
    fn layout(&self) -> &'static LandmarkLayout {
        &MEDIAPIPE_FACE_MESH
    }

    /// Detect faces in `frame`; an empty vector means no face
    fn detect(
        &mut self,
        frame: &RgbaImage,
        timestamp_ms: f64,
    ) -> Result<Vec<LandmarkSet>, DetectorError>;
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for Box<P> {
    fn layout(&self) -> &'static LandmarkLayout {
        (**self).layout()
    }

    fn detect(
        &mut self,
        frame: &RgbaImage,
        timestamp_ms: f64,
    ) -> Result<Vec<LandmarkSet>, DetectorError> {
        (**self).detect(frame, timestamp_ms)
    }
}
