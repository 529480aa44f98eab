// SPDX-License-Identifier: MPL-2.0

//! Center-crop geometry
//!
//! Cuts the longer axis of a source symmetrically about its center until
//! the remainder has the target aspect ratio. No letterboxing.

use image::imageops::{self, FilterType as ResizeFilter};
use image::{Rgba, Rgba32FImage, RgbaImage};

/// Source rectangle in source pixel units (may be fractional)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub sx: f64,
    pub sy: f64,
    pub sw: f64,
    pub sh: f64,
}

impl CropRect {
    /// Whole-pixel bounds `(x, y, width, height)` clamped inside the source
    pub fn pixel_bounds(&self, source_width: u32, source_height: u32) -> (u32, u32, u32, u32) {
        let x = (self.sx.round().max(0.0) as u32).min(source_width.saturating_sub(1));
        let y = (self.sy.round().max(0.0) as u32).min(source_height.saturating_sub(1));
        let width = (self.sw.round() as u32).clamp(1, source_width - x);
        let height = (self.sh.round() as u32).clamp(1, source_height - y);
        (x, y, width, height)
    }
}

/// Center crop of a `source_width` x `source_height` frame to `target_ratio` (w/h)
pub fn center_crop(source_width: u32, source_height: u32, target_ratio: f64) -> CropRect {
    let (vw, vh) = (source_width as f64, source_height as f64);
    let source_ratio = vw / vh;
    if source_ratio > target_ratio {
        // Too wide: trim left and right
        let sw = vh * target_ratio;
        CropRect {
            sx: (vw - sw) / 2.0,
            sy: 0.0,
            sw,
            sh: vh,
        }
    } else {
        // Too tall (or exact): trim top and bottom
        let sh = vw / target_ratio;
        CropRect {
            sx: 0.0,
            sy: (vh - sh) / 2.0,
            sw: vw,
            sh,
        }
    }
}

/// Cut `crop` out of `source` and scale it to fill `width` x `height`
pub fn crop_and_scale(source: &RgbaImage, crop: CropRect, width: u32, height: u32) -> RgbaImage {
    let (x, y, w, h) = crop.pixel_bounds(source.width(), source.height());
    let region = imageops::crop_imm(source, x, y, w, h).to_image();
    if region.dimensions() == (width, height) {
        return region;
    }
    imageops::resize(&region, width, height, ResizeFilter::Triangle)
}

/// [`crop_and_scale`] for transparent layers
///
/// Filtering runs on premultiplied color, so fully transparent pixels add
/// no color to the edges of what is drawn on the layer.
pub fn crop_and_scale_layer(
    layer: &RgbaImage,
    crop: CropRect,
    width: u32,
    height: u32,
) -> RgbaImage {
    let (x, y, w, h) = crop.pixel_bounds(layer.width(), layer.height());
    let region = imageops::crop_imm(layer, x, y, w, h).to_image();
    if region.dimensions() == (width, height) {
        return region;
    }

    let premultiplied = Rgba32FImage::from_fn(w, h, |px, py| {
        let p = region.get_pixel(px, py);
        let a = p[3] as f32 / 255.0;
        Rgba([
            p[0] as f32 / 255.0 * a,
            p[1] as f32 / 255.0 * a,
            p[2] as f32 / 255.0 * a,
            a,
        ])
    });
    let scaled = imageops::resize(&premultiplied, width, height, ResizeFilter::Triangle);

    RgbaImage::from_fn(width, height, |px, py| {
        let p = scaled.get_pixel(px, py);
        let a = p[3].clamp(0.0, 1.0);
        if a <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        let channel = |v: f32| ((v / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([channel(p[0]), channel(p[1]), channel(p[2]), channel(a)])
    })
}
