// SPDX-License-Identifier: MPL-2.0

//! Face-tracked AR effects
//!
//! Every tick the overlay surface is resized to the frame, cleared, and
//! redrawn from the first detected face only:
//!
//! 1. smoothing pass (when beauty intensity is above zero)
//! 2. exactly one effect, chosen by [`FaceEffect`]
//!
//! Nothing carries over between ticks. Landmark indices are resolved through
//! a [`LandmarkLayout`], so the drawing code only names face regions.

pub mod decorations;
pub mod makeup;
pub mod render_loop;
pub mod smoothing;

pub use render_loop::{
    DetectorStatus, OverlaySurface, RenderLoopHandle, RenderLoopOptions, spawn_render_loop,
};

use crate::backends::landmarks::{FaceRegion, LandmarkLayout, LandmarkSet, MEDIAPIPE_FACE_MESH};
use crate::constants::effects::SMOOTHING_MAX_BLUR;
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Selectable face effect; effects are mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceEffect {
    #[default]
    None,
    /// Red-toned ellipses on both cheeks
    Blush,
    /// Brown speckles over nose and cheeks
    Freckles,
    /// Ring of blossoms around the face
    Flowers,
    /// Twinkling stars on cheeks and forehead
    Glitter,
}

impl FaceEffect {
    pub const ALL: [FaceEffect; 5] = [
        FaceEffect::None,
        FaceEffect::Blush,
        FaceEffect::Freckles,
        FaceEffect::Flowers,
        FaceEffect::Glitter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FaceEffect::None => "none",
            FaceEffect::Blush => "blush",
            FaceEffect::Freckles => "freckles",
            FaceEffect::Flowers => "flowers",
            FaceEffect::Glitter => "glitter",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FaceEffect::None => "None",
            FaceEffect::Blush => "Blush",
            FaceEffect::Freckles => "Freckles",
            FaceEffect::Flowers => "Flowers",
            FaceEffect::Glitter => "Glitter",
        }
    }
}

impl fmt::Display for FaceEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FaceEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown face effect '{}'", s))
    }
}

/// Skin smoothing strength, 0 (off) to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct BeautyIntensity(u8);

impl BeautyIntensity {
    pub const MAX: u8 = 100;

    /// Clamp any value into 0..=100
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_enabled(self) -> bool {
        self.0 > 0
    }

    /// Blur radius in pixels: linear in intensity, capped at 2% of the
    /// smaller frame dimension, never below one pixel
    pub fn blur_radius(self, width: u32, height: u32) -> u32 {
        let scaled = self.0 as f32 / 100.0 * width.min(height) as f32 * SMOOTHING_MAX_BLUR;
        (scaled.round() as u32).max(1)
    }
}

impl From<i64> for BeautyIntensity {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<BeautyIntensity> for u8 {
    fn from(value: BeautyIntensity) -> Self {
        value.0
    }
}

/// Per-tick renderer input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSettings {
    pub effect: FaceEffect,
    pub beauty: BeautyIntensity,
}

/// A drawing pass applied to the overlay during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    Smoothing,
    Effect(FaceEffect),
}

/// Pixel-space view of one face
pub struct FaceAnchors<'a> {
    face: &'a LandmarkSet,
    layout: &'static LandmarkLayout,
    width: u32,
    height: u32,
}

impl<'a> FaceAnchors<'a> {
    pub fn new(face: &'a LandmarkSet, layout: &'static LandmarkLayout, width: u32, height: u32) -> Self {
        Self {
            face,
            layout,
            width,
            height,
        }
    }

    /// Pixel position of `region`, if the face has it
    pub fn pixel(&self, region: FaceRegion) -> Option<(f32, f32)> {
        self.face
            .locate(self.layout, region)
            .map(|p| p.to_pixel(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn max_dimension(&self) -> f32 {
        self.width.max(self.height) as f32
    }

    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height) as f32
    }
}

/// Draws smoothing and effects into the overlay surface
pub struct EffectRenderer<R = StdRng> {
    rng: R,
    layout: &'static LandmarkLayout,
}

impl EffectRenderer<StdRng> {
    /// Renderer with OS-seeded randomness
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Renderer with reproducible randomness
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EffectRenderer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            layout: &MEDIAPIPE_FACE_MESH,
        }
    }

    /// Resolve landmark indices through `layout`
    pub fn set_layout(&mut self, layout: &'static LandmarkLayout) {
        self.layout = layout;
    }

    /// Redraw `surface` for one tick and report which passes ran
    pub fn render(
        &mut self,
        surface: &mut RgbaImage,
        frame: &RgbaImage,
        faces: &[LandmarkSet],
        settings: RenderSettings,
    ) -> Vec<RenderPass> {
        prepare_surface(surface, frame.width(), frame.height());

        // Single-face support: only the first detection is used
        let Some(face) = faces.first() else {
            return Vec::new();
        };
        let anchors = FaceAnchors::new(face, self.layout, frame.width(), frame.height());
        let mut passes = Vec::with_capacity(2);

        if settings.beauty.is_enabled() && smoothing::draw_smoothing(surface, frame, face, settings.beauty) {
            passes.push(RenderPass::Smoothing);
        }

        let drawn = match settings.effect {
            FaceEffect::None => false,
            FaceEffect::Blush => makeup::draw_blush(surface, &anchors),
            FaceEffect::Freckles => makeup::draw_freckles(surface, &anchors, &mut self.rng),
            FaceEffect::Flowers => decorations::draw_flowers(surface, &anchors, &mut self.rng),
            FaceEffect::Glitter => decorations::draw_glitter(surface, &anchors, &mut self.rng),
        };
        if drawn {
            passes.push(RenderPass::Effect(settings.effect));
        } else if settings.effect != FaceEffect::None {
            trace!(effect = settings.effect.name(), "Effect anchors missing on this face");
        }
        passes
    }
}

/// Match `surface` to the frame size and clear it
pub fn prepare_surface(surface: &mut RgbaImage, width: u32, height: u32) {
    if surface.dimensions() != (width, height) {
        *surface = RgbaImage::new(width, height);
        return;
    }
    for pixel in surface.pixels_mut() {
        *pixel = Rgba([0, 0, 0, 0]);
    }
}

/// Uniform value in `-spread/2 .. spread/2`
pub(crate) fn jitter<R: Rng>(rng: &mut R, spread: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * spread
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::landmarks::NormalizedLandmark;

    pub(crate) fn face() -> LandmarkSet {
        let mut points = vec![NormalizedLandmark::new(0.5, 0.5); 478];
        for (i, p) in points.iter_mut().enumerate() {
            let t = i as f32 / 478.0 * std::f32::consts::TAU;
            *p = NormalizedLandmark::new(0.5 + 0.2 * t.cos(), 0.5 + 0.25 * t.sin());
        }
        points[234] = NormalizedLandmark::new(0.35, 0.55);
        points[454] = NormalizedLandmark::new(0.65, 0.55);
        points[168] = NormalizedLandmark::new(0.5, 0.45);
        points[10] = NormalizedLandmark::new(0.5, 0.3);
        points[4] = NormalizedLandmark::new(0.5, 0.55);
        LandmarkSet::new(points)
    }

    fn frame() -> RgbaImage {
        RgbaImage::from_fn(160, 120, |x, y| Rgba([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 80, 255]))
    }

    #[test]
    fn test_blur_radius_scaling() {
        assert_eq!(BeautyIntensity::new(100).blur_radius(1280, 720), 14);
        assert_eq!(BeautyIntensity::new(50).blur_radius(1280, 720), 7);
        assert_eq!(BeautyIntensity::new(1).blur_radius(1280, 720), 1);
        assert_eq!(BeautyIntensity::new(250).value(), 100);
        assert_eq!(BeautyIntensity::new(-3).value(), 0);
    }

    #[test]
    fn test_beauty_serde_clamps() {
        let beauty: BeautyIntensity = serde_json::from_str("140").unwrap();
        assert_eq!(beauty.value(), 100);
        assert_eq!(serde_json::to_string(&BeautyIntensity::new(42)).unwrap(), "42");
    }

    #[test]
    fn test_no_face_leaves_surface_cleared() {
        let mut surface = RgbaImage::from_pixel(160, 120, Rgba([1, 2, 3, 4]));
        let mut renderer = EffectRenderer::seeded(1);
        let settings = RenderSettings {
            effect: FaceEffect::Blush,
            beauty: BeautyIntensity::new(80),
        };
        let passes = renderer.render(&mut surface, &frame(), &[], settings);
        assert!(passes.is_empty());
        assert!(surface.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_surface_resized_to_frame() {
        let mut surface = RgbaImage::new(10, 10);
        EffectRenderer::seeded(1).render(&mut surface, &frame(), &[], RenderSettings::default());
        assert_eq!(surface.dimensions(), (160, 120));
    }

    #[test]
    fn test_glitter_with_beauty_runs_two_passes_in_order() {
        let mut surface = RgbaImage::new(160, 120);
        let settings = RenderSettings {
            effect: FaceEffect::Glitter,
            beauty: BeautyIntensity::new(50),
        };
        let passes = EffectRenderer::seeded(7).render(&mut surface, &frame(), &[face()], settings);
        assert_eq!(
            passes,
            vec![RenderPass::Smoothing, RenderPass::Effect(FaceEffect::Glitter)]
        );
    }

    #[test]
    fn test_zero_beauty_skips_smoothing() {
        let mut surface = RgbaImage::new(160, 120);
        let settings = RenderSettings {
            effect: FaceEffect::Blush,
            beauty: BeautyIntensity::new(0),
        };
        let passes = EffectRenderer::seeded(7).render(&mut surface, &frame(), &[face()], settings);
        assert_eq!(passes, vec![RenderPass::Effect(FaceEffect::Blush)]);
    }

    #[test]
    fn test_effects_do_not_accumulate() {
        let mut renderer = EffectRenderer::seeded(3);
        let mut surface = RgbaImage::new(160, 120);
        let blush = RenderSettings {
            effect: FaceEffect::Blush,
            ..RenderSettings::default()
        };
        renderer.render(&mut surface, &frame(), &[face()], blush);
        let first = surface.clone();
        renderer.render(&mut surface, &frame(), &[face()], blush);
        assert_eq!(surface, first);
    }

    #[test]
    fn test_effect_names_parse() {
        assert_eq!("Glitter".parse::<FaceEffect>(), Ok(FaceEffect::Glitter));
        assert!("sparkles".parse::<FaceEffect>().is_err());
    }
}
