// SPDX-License-Identifier: MPL-2.0

//! Drawing primitives shared by the capture, effect and strip pipelines
//!
//! Surfaces are plain [`RgbaImage`] buffers. Shapes are rasterized with
//! `imageproc` through a [`Blended`] canvas (source-over per pixel) or onto a
//! scratch layer that is then composited with a global opacity, which mirrors
//! how a 2D canvas applies `globalAlpha` to a whole path.

use crate::errors::PhotoError;
use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{Canvas, draw_text_mut, text_size};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Separable blend modes used by overlay paints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Screen,
}

impl BlendMode {
    /// Blend backdrop `cb` with source `cs` (both 0..1)
    fn mix(self, cb: f32, cs: f32) -> f32 {
        match self {
            BlendMode::Normal => cs,
            BlendMode::Screen => cb + cs - cb * cs,
        }
    }
}

#[inline]
fn unit(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Composite `src` over `dst` with an extra global `opacity`
pub fn blend(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32, mode: BlendMode) -> Rgba<u8> {
    let sa = unit(src[3]) * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = unit(dst[3]);
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let cs = unit(src[c]);
        let cb = unit(dst[c]);
        let mixed = (1.0 - da) * cs + da * mode.mix(cb, cs);
        out[c] = byte((sa * mixed + da * cb * (1.0 - sa)) / out_a);
    }
    out[3] = byte(out_a);
    Rgba(out)
}

/// Interpolate two RGBA colors in premultiplied space (gradient stops)
pub fn lerp_premultiplied(from: [u8; 4], to: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let (fa, ta) = (unit(from[3]), unit(to[3]));
    let alpha = fa + (ta - fa) * t;
    if alpha <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let premul = unit(from[c]) * fa + (unit(to[c]) * ta - unit(from[c]) * fa) * t;
        out[c] = byte(premul / alpha);
    }
    out[3] = byte(alpha);
    out
}

/// Composite an equally sized layer over `dst`
pub fn composite(dst: &mut RgbaImage, layer: &RgbaImage, opacity: f32) {
    if dst.dimensions() != layer.dimensions() {
        debug!(
            dst = ?dst.dimensions(),
            layer = ?layer.dimensions(),
            "Skipping composite of mismatched layer"
        );
        return;
    }
    for (d, s) in dst.pixels_mut().zip(layer.pixels()) {
        if s[3] != 0 {
            *d = blend(*d, *s, opacity, BlendMode::Normal);
        }
    }
}

/// Canvas that alpha-blends every pixel it draws
pub struct Blended<'a>(pub &'a mut RgbaImage);

impl Canvas for Blended<'_> {
    type Pixel = Rgba<u8>;

    fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        *self.0.get_pixel(x, y)
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Self::Pixel) {
        let dst = self.0.get_pixel_mut(x, y);
        *dst = blend(*dst, color, 1.0, BlendMode::Normal);
    }
}

/// Fill an axis-aligned rectangle (clipped to the image)
pub fn fill_rect(image: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, color: [u8; 4]) {
    if width == 0 || height == 0 {
        return;
    }
    let rect = imageproc::rect::Rect::at(x, y).of_size(width, height);
    imageproc::drawing::draw_filled_rect_mut(&mut Blended(image), rect, Rgba(color));
}

/// Outline a rectangle with a stroke centered on its edge
pub fn stroke_rect(
    image: &mut RgbaImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    line_width: u32,
    color: [u8; 4],
) {
    let half = (line_width / 2) as i32;
    for inset in 0..line_width.max(1) as i32 {
        let offset = inset - half;
        let w = width as i32 - 2 * offset;
        let h = height as i32 - 2 * offset;
        if w <= 0 || h <= 0 {
            continue;
        }
        let rect = imageproc::rect::Rect::at(x + offset, y + offset).of_size(w as u32, h as u32);
        imageproc::drawing::draw_hollow_rect_mut(&mut Blended(image), rect, Rgba(color));
    }
}

/// Stroke a straight line; widths above one pixel draw parallel passes
pub fn stroke_line(
    image: &mut RgbaImage,
    from: (f32, f32),
    to: (f32, f32),
    line_width: f32,
    color: [u8; 4],
) {
    let passes = line_width.round().max(1.0) as i32;
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return;
    }
    let (nx, ny) = (-dy / len, dx / len);
    let mut canvas = Blended(image);
    for pass in 0..passes {
        let shift = pass as f32 - (passes - 1) as f32 / 2.0;
        imageproc::drawing::draw_line_segment_mut(
            &mut canvas,
            (from.0 + nx * shift, from.1 + ny * shift),
            (to.0 + nx * shift, to.1 + ny * shift),
            Rgba(color),
        );
    }
}

/// Fill an axis-aligned ellipse on a scratch layer (opaque, no blending)
pub fn fill_ellipse(layer: &mut RgbaImage, center: (f32, f32), rx: f32, ry: f32, color: [u8; 4]) {
    let c = (center.0.round() as i32, center.1.round() as i32);
    let (rx, ry) = (rx.round().max(1.0) as i32, ry.round().max(1.0) as i32);
    imageproc::drawing::draw_filled_ellipse_mut(layer, c, rx, ry, Rgba(color));
}

/// Fill a circle on a scratch layer (opaque, no blending)
pub fn fill_circle(layer: &mut RgbaImage, center: (f32, f32), radius: f32, color: [u8; 4]) {
    let c = (center.0.round() as i32, center.1.round() as i32);
    imageproc::drawing::draw_filled_circle_mut(layer, c, radius.round().max(0.0) as i32, Rgba(color));
}

/// Copy `src` into `dst` inside an ellipse, blended at `opacity`
pub fn draw_clipped_ellipse(
    dst: &mut RgbaImage,
    src: &RgbaImage,
    src_origin: (i32, i32),
    center: (f32, f32),
    rx: f32,
    ry: f32,
    opacity: f32,
) {
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let (w, h) = (dst.width() as i32, dst.height() as i32);
    let x0 = ((center.0 - rx).floor() as i32).max(0);
    let x1 = ((center.0 + rx).ceil() as i32).min(w - 1);
    let y0 = ((center.1 - ry).floor() as i32).max(0);
    let y1 = ((center.1 + ry).ceil() as i32).min(h - 1);
    for y in y0..=y1 {
        let ny = (y as f32 + 0.5 - center.1) / ry;
        for x in x0..=x1 {
            let nx = (x as f32 + 0.5 - center.0) / rx;
            if nx * nx + ny * ny > 1.0 {
                continue;
            }
            let (sx, sy) = (x - src_origin.0, y - src_origin.1);
            if sx < 0 || sy < 0 || sx >= src.width() as i32 || sy >= src.height() as i32 {
                continue;
            }
            let color = *src.get_pixel(sx as u32, sy as u32);
            let d = dst.get_pixel_mut(x as u32, y as u32);
            *d = blend(*d, color, opacity, BlendMode::Normal);
        }
    }
}

#[derive(RustEmbed)]
#[folder = "resources/fonts/"]
struct FontAssets;

/// Bundled typefaces
pub struct Fonts {
    pub regular: FontArc,
    pub bold: FontArc,
}

static FONTS: OnceLock<Result<Fonts, String>> = OnceLock::new();

fn load_font(file: &str) -> Result<FontArc, String> {
    let asset = FontAssets::get(file).ok_or_else(|| format!("missing font asset {}", file))?;
    FontArc::try_from_vec(asset.data.into_owned()).map_err(|e| format!("{}: {}", file, e))
}

/// Bundled fonts, loaded once
pub fn fonts() -> Result<&'static Fonts, PhotoError> {
    FONTS
        .get_or_init(|| {
            Ok(Fonts {
                regular: load_font("DejaVuSans.ttf")?,
                bold: load_font("DejaVuSans-Bold.ttf")?,
            })
        })
        .as_ref()
        .map_err(|e| PhotoError::FontUnavailable(e.clone()))
}

/// Horizontal anchor of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Distance from the top of a text run to its baseline
fn ascent(font: &FontArc, px: f32) -> f32 {
    font.as_scaled(PxScale::from(px)).ascent()
}

/// Width of `text` at `px` pixels
pub fn measure_text(font: &FontArc, px: f32, text: &str) -> f32 {
    text_size(PxScale::from(px), font, text).0 as f32
}

/// Draw one line of text anchored at (`x`, `baseline`)
pub fn draw_text(
    image: &mut RgbaImage,
    font: &FontArc,
    px: f32,
    x: f32,
    baseline: f32,
    align: TextAlign,
    color: [u8; 4],
    text: &str,
) {
    let start = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - measure_text(font, px, text) / 2.0,
    };
    draw_text_mut(
        &mut Blended(image),
        Rgba(color),
        start.round() as i32,
        (baseline - ascent(font, px)).round() as i32,
        PxScale::from(px),
        font,
        text,
    );
}

/// Draw outlined text: the stroke first, then the fill on top
pub fn draw_text_outlined(
    image: &mut RgbaImage,
    font: &FontArc,
    px: f32,
    x: f32,
    baseline: f32,
    stroke_width: u32,
    fill: [u8; 4],
    stroke: [u8; 4],
    text: &str,
) {
    let radius = (stroke_width / 2).max(1);
    let top = baseline - ascent(font, px);
    let mask = outline_mask(font, px, text, radius);
    let pad = radius as i32 + OUTLINE_SLACK;
    let (ox, oy) = (x.round() as i32 - pad, top.round() as i32 - pad);
    for (mx, my, coverage) in mask.enumerate_pixels() {
        let (ix, iy) = (ox + mx as i32, oy + my as i32);
        if coverage[0] == 0
            || ix < 0
            || iy < 0
            || ix >= image.width() as i32
            || iy >= image.height() as i32
        {
            continue;
        }
        let d = image.get_pixel_mut(ix as u32, iy as u32);
        *d = blend(*d, Rgba(stroke), unit(coverage[0]), BlendMode::Normal);
    }
    draw_text(image, font, px, x, baseline, TextAlign::Left, fill, text);
}

/// Room around the text box for glyphs that overhang their advance
const OUTLINE_SLACK: i32 = 2;

/// Text coverage grown by `radius` pixels, offset by the padding
fn outline_mask(font: &FontArc, px: f32, text: &str, radius: u32) -> GrayImage {
    let scale = PxScale::from(px);
    let (width, _) = text_size(scale, font, text);
    let height = font.as_scaled(scale).height().ceil() as u32;
    let pad = radius as i32 + OUTLINE_SLACK;
    let size = |n: u32| n + 2 * pad as u32;

    let mut glyphs = GrayImage::new(size(width), size(height));
    draw_text_mut(&mut glyphs, Luma([255]), pad, pad, scale, font, text);

    let r = radius as i32;
    let (w, h) = (glyphs.width() as i32, glyphs.height() as i32);
    GrayImage::from_fn(glyphs.width(), glyphs.height(), |x, y| {
        let mut best = 0u8;
        for dy in -r..=r {
            for dx in -r..=r {
                let (sx, sy) = (x as i32 + dx, y as i32 + dy);
                if dx * dx + dy * dy <= r * r && sx >= 0 && sy >= 0 && sx < w && sy < h {
                    best = best.max(glyphs.get_pixel(sx as u32, sy as u32)[0]);
                }
            }
        }
        Luma([best])
    })
}
