// SPDX-License-Identifier: MPL-2.0

//! Blush and freckles

use super::{FaceAnchors, jitter};
use crate::backends::landmarks::FaceRegion;
use crate::constants::effects::*;
use crate::pipelines::canvas;
use image::RgbaImage;
use rand::Rng;

/// Anchors freckles are scattered around: nose, nose bridge and cheeks
const FRECKLE_REGIONS: [FaceRegion; 7] = [
    FaceRegion::NoseTip,
    FaceRegion::Subnasal,
    FaceRegion::LeftNoseWing,
    FaceRegion::LeftCheek,
    FaceRegion::RightCheek,
    FaceRegion::NoseBridgeLower,
    FaceRegion::NoseBridgeUpper,
];

/// Two translucent ellipses on the cheeks; needs both cheeks
pub fn draw_blush(surface: &mut RgbaImage, anchors: &FaceAnchors<'_>) -> bool {
    let (Some(left), Some(right)) = (
        anchors.pixel(FaceRegion::LeftCheek),
        anchors.pixel(FaceRegion::RightCheek),
    ) else {
        return false;
    };

    let radius = anchors.max_dimension() * BLUSH_RADIUS;
    let mut layer = RgbaImage::new(surface.width(), surface.height());
    for cheek in [left, right] {
        canvas::fill_ellipse(&mut layer, cheek, radius, radius * BLUSH_SQUASH, BLUSH_COLOR);
    }
    canvas::composite(surface, &layer, BLUSH_OPACITY);
    true
}

/// Small brown dots scattered around each available anchor
pub fn draw_freckles<R: Rng>(surface: &mut RgbaImage, anchors: &FaceAnchors<'_>, rng: &mut R) -> bool {
    let points: Vec<(f32, f32)> = FRECKLE_REGIONS
        .iter()
        .filter_map(|region| anchors.pixel(*region))
        .collect();
    if points.is_empty() {
        return false;
    }

    let mut layer = RgbaImage::new(surface.width(), surface.height());
    for (x, y) in points {
        for _ in 0..FRECKLES_PER_ANCHOR {
            let ox = jitter(rng, FRECKLE_SPREAD_X);
            let oy = jitter(rng, FRECKLE_SPREAD_Y);
            let radius = FRECKLE_MIN_RADIUS + rng.random::<f32>() * FRECKLE_RADIUS_RANGE;
            canvas::fill_circle(&mut layer, (x + ox, y + oy), radius, FRECKLE_COLOR);
        }
    }
    canvas::composite(surface, &layer, FRECKLE_OPACITY);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::landmarks::{LandmarkSet, MEDIAPIPE_FACE_MESH, NormalizedLandmark};
    use crate::pipelines::effects::tests::face;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_blush_tints_both_cheeks() {
        let face = face();
        let anchors = FaceAnchors::new(&face, &MEDIAPIPE_FACE_MESH, 200, 100);
        let mut surface = RgbaImage::new(200, 100);
        assert!(draw_blush(&mut surface, &anchors));
        // Cheeks at (70, 55) and (130, 55)
        for x in [70, 130] {
            let p = surface.get_pixel(x, 55);
            assert_eq!((p[0], p[1], p[2]), (0xff, 0x6b, 0x6b));
            assert!((63..=64).contains(&p[3]));
        }
        assert_eq!(surface.get_pixel(100, 5)[3], 0);
    }

    #[test]
    fn test_blush_needs_both_cheeks() {
        let face = LandmarkSet::new(vec![NormalizedLandmark::new(0.4, 0.5); 300]);
        let anchors = FaceAnchors::new(&face, &MEDIAPIPE_FACE_MESH, 100, 100);
        let mut surface = RgbaImage::new(100, 100);
        assert!(!draw_blush(&mut surface, &anchors));
        assert!(surface.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_freckles_stay_near_anchors() {
        let face = face();
        let anchors = FaceAnchors::new(&face, &MEDIAPIPE_FACE_MESH, 400, 400);
        let mut surface = RgbaImage::new(400, 400);
        let mut rng = StdRng::seed_from_u64(11);
        assert!(draw_freckles(&mut surface, &anchors, &mut rng));
        let anchor_points: Vec<(f32, f32)> = FRECKLE_REGIONS
            .iter()
            .filter_map(|r| anchors.pixel(*r))
            .collect();
        for (x, y, p) in surface.enumerate_pixels() {
            if p[3] > 0 {
                let near = anchor_points
                    .iter()
                    .any(|(ax, ay)| (x as f32 - ax).abs() <= 12.0 && (y as f32 - ay).abs() <= 10.0);
                assert!(near, "freckle at ({}, {}) is far from every anchor", x, y);
            }
        }
    }
}
