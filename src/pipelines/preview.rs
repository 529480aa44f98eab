// SPDX-License-Identifier: MPL-2.0

//! Live preview composition
//!
//! The preview uses the same filter passes as capture, in the same order, so
//! what the user sees is what gets saved. The overlay sits above the video
//! and is not filtered. Mirroring applies to the preview only.

use super::canvas;
use super::filters::{self, FilterType};
use image::RgbaImage;
use image::imageops;
use tracing::trace;

/// Compose one preview image from the full frame and the overlay surface
pub fn compose_preview(
    frame: &RgbaImage,
    filter: FilterType,
    overlay: Option<&RgbaImage>,
    mirror: bool,
) -> RgbaImage {
    let mut preview = frame.clone();
    filters::apply_base_filter(&mut preview, filter);

    if let Some(surface) = overlay {
        if surface.dimensions() == preview.dimensions() {
            canvas::composite(&mut preview, surface, 1.0);
        } else {
            // The render loop has not caught up with a resolution change yet
            trace!(overlay = ?surface.dimensions(), "Skipping stale overlay");
        }
    }

    filters::apply_overlay_paint(&mut preview, filter);

    if mirror {
        imageops::flip_horizontal_in_place(&mut preview);
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn split_frame() -> RgbaImage {
        RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn test_normal_unmirrored_is_identity() {
        let frame = split_frame();
        assert_eq!(compose_preview(&frame, FilterType::Normal, None, false), frame);
    }

    #[test]
    fn test_mirror_flips_horizontally() {
        let preview = compose_preview(&split_frame(), FilterType::Normal, None, true);
        assert_eq!(preview.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(preview.get_pixel(3, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_overlay_is_not_filtered() {
        let frame = split_frame();
        let mut overlay = RgbaImage::new(4, 2);
        overlay.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
        let preview = compose_preview(&frame, FilterType::Grayscale, Some(&overlay), false);
        assert_eq!(preview.get_pixel(0, 0).0, [0, 255, 0, 255]);
        let gray = preview.get_pixel(3, 0).0;
        assert_eq!(gray[0], gray[1]);
        assert_eq!(gray[1], gray[2]);
    }

    #[test]
    fn test_mismatched_overlay_is_ignored() {
        let frame = split_frame();
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
        assert_eq!(compose_preview(&frame, FilterType::Normal, Some(&overlay), false), frame);
    }
}
