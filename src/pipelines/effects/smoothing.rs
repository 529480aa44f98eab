// SPDX-License-Identifier: MPL-2.0

//! Skin smoothing pass
//!
//! A blurred copy of the frame is drawn over the face, clipped to an
//! ellipse derived from the landmark bounding box. Only the ellipse's
//! neighbourhood is blurred.

use super::BeautyIntensity;
use crate::backends::landmarks::LandmarkSet;
use crate::constants::effects::{SMOOTHING_OPACITY, SMOOTHING_RADIUS_X, SMOOTHING_RADIUS_Y};
use crate::pipelines::canvas;
use image::RgbaImage;
use image::imageops;

/// Face ellipse in pixels: center and radii
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceEllipse {
    pub cx: f32,
    pub cy: f32,
    pub rx: f32,
    pub ry: f32,
}

impl FaceEllipse {
    /// Ellipse around all keypoints of `face` on a `width` x `height` frame
    pub fn from_landmarks(face: &LandmarkSet, width: u32, height: u32) -> Option<Self> {
        let (x0, y0, x1, y1) = face.bounds()?;
        let (w, h) = (width as f32, height as f32);
        let (min_x, max_x) = (x0 * w, x1 * w);
        let (min_y, max_y) = (y0 * h, y1 * h);
        let ellipse = Self {
            cx: (min_x + max_x) / 2.0,
            cy: (min_y + max_y) / 2.0,
            rx: (max_x - min_x) * SMOOTHING_RADIUS_X,
            ry: (max_y - min_y) * SMOOTHING_RADIUS_Y,
        };
        (ellipse.rx > 0.0 && ellipse.ry > 0.0).then_some(ellipse)
    }
}

/// Draw the smoothing pass; false when the face has no usable extent
pub fn draw_smoothing(
    surface: &mut RgbaImage,
    frame: &RgbaImage,
    face: &LandmarkSet,
    beauty: BeautyIntensity,
) -> bool {
    let (width, height) = frame.dimensions();
    let Some(ellipse) = FaceEllipse::from_landmarks(face, width, height) else {
        return false;
    };

    let sigma = beauty.blur_radius(width, height) as f32;
    let margin = (sigma * 3.0).ceil();
    let left = (ellipse.cx - ellipse.rx - margin).floor().clamp(0.0, width as f32) as u32;
    let top = (ellipse.cy - ellipse.ry - margin).floor().clamp(0.0, height as f32) as u32;
    let right = (ellipse.cx + ellipse.rx + margin).ceil().clamp(0.0, width as f32) as u32;
    let bottom = (ellipse.cy + ellipse.ry + margin).ceil().clamp(0.0, height as f32) as u32;
    if right <= left || bottom <= top {
        return false;
    }

    let patch = imageops::crop_imm(frame, left, top, right - left, bottom - top).to_image();
    let blurred = imageops::blur(&patch, sigma);
    canvas::draw_clipped_ellipse(
        surface,
        &blurred,
        (left as i32, top as i32),
        (ellipse.cx, ellipse.cy),
        ellipse.rx,
        ellipse.ry,
        SMOOTHING_OPACITY,
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::landmarks::NormalizedLandmark;
    use image::Rgba;

    #[test]
    fn test_ellipse_from_bounding_box() {
        let face = LandmarkSet::new(vec![
            NormalizedLandmark::new(0.25, 0.2),
            NormalizedLandmark::new(0.75, 0.8),
        ]);
        let e = FaceEllipse::from_landmarks(&face, 200, 100).unwrap();
        assert_eq!((e.cx, e.cy), (100.0, 50.0));
        assert!((e.rx - 60.0).abs() < 1e-4);
        assert!((e.ry - 42.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_face_skipped() {
        let face = LandmarkSet::new(vec![NormalizedLandmark::new(0.5, 0.5)]);
        let mut surface = RgbaImage::new(50, 50);
        let frame = RgbaImage::new(50, 50);
        assert!(!draw_smoothing(&mut surface, &frame, &face, BeautyIntensity::new(50)));
    }

    #[test]
    fn test_smoothing_covers_center_at_ninety_percent() {
        let face = LandmarkSet::new(vec![
            NormalizedLandmark::new(0.3, 0.3),
            NormalizedLandmark::new(0.7, 0.7),
        ]);
        let frame = RgbaImage::from_pixel(100, 100, Rgba([200, 150, 120, 255]));
        let mut surface = RgbaImage::new(100, 100);
        assert!(draw_smoothing(&mut surface, &frame, &face, BeautyIntensity::new(100)));
        let center = surface.get_pixel(50, 50);
        assert!((229..=230).contains(&center[3]));
        assert_eq!(center[0], 200);
        assert_eq!(surface.get_pixel(1, 1)[3], 0);
    }
}
