// SPDX-License-Identifier: MPL-2.0

//! Filter engine
//!
//! Every filter is a row in one lookup table: a base expression (a chain of
//! CSS-style color operations applied to the camera frame) and an optional
//! translucent paint layered over the whole image afterwards. Preview and
//! capture both go through [`apply_base_filter`] then [`apply_overlay_paint`],
//! so the two paths cannot drift apart.

use crate::pipelines::canvas::{self, BlendMode};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selectable photo filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum FilterType {
    /// No filter applied
    #[default]
    Normal,
    Grayscale,
    Sepia,
    Blur,
    Brightness,
    /// Punchy contrast with cool shadows
    Clarendon,
    /// Washed-out lavender tint
    Gingham,
    /// Saturated with a warm cast
    Juno,
    /// Bright, airy highlights
    Lark,
    /// Faded pastel with a cold haze
    Aden,
    /// Blue-to-teal gradient wash
    Perpetua,
}

impl FilterType {
    /// All filters in display order
    pub const ALL: [FilterType; 11] = [
        FilterType::Normal,
        FilterType::Grayscale,
        FilterType::Sepia,
        FilterType::Blur,
        FilterType::Brightness,
        FilterType::Clarendon,
        FilterType::Gingham,
        FilterType::Juno,
        FilterType::Lark,
        FilterType::Aden,
        FilterType::Perpetua,
    ];

    /// Stable lowercase identifier
    pub fn name(self) -> &'static str {
        self.preset().name
    }

    /// Display name for pickers
    pub fn display_name(self) -> &'static str {
        self.preset().label
    }

    /// Resolve an identifier; anything unrecognized is the identity filter
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }

    /// Table row for this filter
    pub fn preset(self) -> &'static FilterPreset {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        &PRESETS[index]
    }

    /// Base filter expression in CSS filter syntax (`"none"` for identity)
    pub fn css(self) -> String {
        css_filter_for(self)
    }
}

impl From<String> for FilterType {
    fn from(name: String) -> Self {
        FilterType::from_name(&name)
    }
}

impl From<FilterType> for &'static str {
    fn from(filter: FilterType) -> Self {
        filter.name()
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One color operation of a base filter expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    /// `grayscale(amount)`, amount in 0..=1
    Grayscale(f32),
    /// `sepia(amount)`, amount in 0..=1
    Sepia(f32),
    /// `blur(radius)`, gaussian standard deviation in pixels
    Blur(f32),
    /// `brightness(factor)`
    Brightness(f32),
    /// `contrast(factor)`
    Contrast(f32),
    /// `saturate(factor)`
    Saturate(f32),
    /// `hue-rotate(degrees)`
    HueRotate(f32),
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Grayscale(a) => write!(f, "grayscale({}%)", a * 100.0),
            FilterOp::Sepia(a) => write!(f, "sepia({}%)", a * 100.0),
            FilterOp::Blur(px) => write!(f, "blur({}px)", px),
            FilterOp::Brightness(v) => write!(f, "brightness({})", v),
            FilterOp::Contrast(v) => write!(f, "contrast({})", v),
            FilterOp::Saturate(v) => write!(f, "saturate({})", v),
            FilterOp::HueRotate(deg) => write!(f, "hue-rotate({}deg)", deg),
        }
    }
}

/// Fill of an overlay paint rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    /// Flat color (alpha included)
    Solid([u8; 4]),
    /// Linear gradient from the top edge to the bottom edge
    VerticalGradient { top: [u8; 4], bottom: [u8; 4] },
}

/// Translucent layer drawn over the whole output after the base filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPaint {
    pub fill: Fill,
    pub opacity: f32,
    pub blend: BlendMode,
}

/// Overlay paint sized for a concrete output rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintRecipe {
    pub paint: OverlayPaint,
    pub width: u32,
    pub height: u32,
}

/// One row of the filter table
#[derive(Debug)]
pub struct FilterPreset {
    pub filter: FilterType,
    pub name: &'static str,
    pub label: &'static str,
    pub ops: &'static [FilterOp],
    pub overlay: Option<OverlayPaint>,
}

const fn tint(color: [u8; 4]) -> Option<OverlayPaint> {
    Some(OverlayPaint {
        fill: Fill::Solid(color),
        opacity: 1.0,
        blend: BlendMode::Normal,
    })
}

const fn gradient(top: [u8; 4], bottom: [u8; 4]) -> Option<OverlayPaint> {
    Some(OverlayPaint {
        fill: Fill::VerticalGradient { top, bottom },
        opacity: 1.0,
        blend: BlendMode::Normal,
    })
}

/// Alpha byte for a CSS alpha fraction
const fn a(fraction_percent: u16) -> u8 {
    ((fraction_percent as u32 * 255 + 50) / 100) as u8
}

/// Indexed in the same order as [`FilterType::ALL`]
static PRESETS: [FilterPreset; 11] = [
    FilterPreset {
        filter: FilterType::Normal,
        name: "normal",
        label: "Normal",
        ops: &[],
        overlay: None,
    },
    FilterPreset {
        filter: FilterType::Grayscale,
        name: "grayscale",
        label: "Grayscale",
        ops: &[FilterOp::Grayscale(1.0)],
        overlay: None,
    },
    FilterPreset {
        filter: FilterType::Sepia,
        name: "sepia",
        label: "Sepia",
        ops: &[FilterOp::Sepia(1.0)],
        overlay: None,
    },
    FilterPreset {
        filter: FilterType::Blur,
        name: "blur",
        label: "Blur",
        ops: &[FilterOp::Blur(2.0)],
        overlay: None,
    },
    FilterPreset {
        filter: FilterType::Brightness,
        name: "brightness",
        label: "Brightness",
        ops: &[FilterOp::Brightness(1.3)],
        overlay: None,
    },
    FilterPreset {
        filter: FilterType::Clarendon,
        name: "clarendon",
        label: "Clarendon",
        ops: &[
            FilterOp::Contrast(1.2),
            FilterOp::Saturate(1.35),
            FilterOp::Brightness(1.05),
        ],
        overlay: gradient([0, 20, 60, a(10)], [255, 255, 255, 0]),
    },
    FilterPreset {
        filter: FilterType::Gingham,
        name: "gingham",
        label: "Gingham",
        ops: &[FilterOp::Brightness(1.05), FilterOp::HueRotate(-10.0)],
        overlay: tint([230, 230, 255, a(15)]),
    },
    FilterPreset {
        filter: FilterType::Juno,
        name: "juno",
        label: "Juno",
        ops: &[FilterOp::Saturate(1.4), FilterOp::Contrast(1.15)],
        overlay: tint([255, 180, 120, a(10)]),
    },
    FilterPreset {
        filter: FilterType::Lark,
        name: "lark",
        label: "Lark",
        ops: &[FilterOp::Brightness(1.1), FilterOp::Saturate(1.1)],
        overlay: Some(OverlayPaint {
            fill: Fill::Solid([255, 250, 235, 255]),
            opacity: 0.08,
            blend: BlendMode::Screen,
        }),
    },
    FilterPreset {
        filter: FilterType::Aden,
        name: "aden",
        label: "Aden",
        ops: &[
            FilterOp::HueRotate(-20.0),
            FilterOp::Saturate(0.85),
            FilterOp::Brightness(1.05),
        ],
        overlay: tint([230, 245, 255, a(18)]),
    },
    FilterPreset {
        filter: FilterType::Perpetua,
        name: "perpetua",
        label: "Perpetua",
        ops: &[FilterOp::Saturate(1.1), FilterOp::Contrast(1.05)],
        overlay: gradient([0, 90, 255, a(10)], [0, 255, 180, a(8)]),
    },
];

/// Base filter expression for a filter, in CSS filter syntax
pub fn css_filter_for(filter: FilterType) -> String {
    let ops = filter.preset().ops;
    if ops.is_empty() {
        return "none".to_string();
    }
    ops.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Overlay paint for a filter sized to `width` x `height`, if it has one
pub fn overlay_paint_for(filter: FilterType, width: u32, height: u32) -> Option<PaintRecipe> {
    filter.preset().overlay.map(|paint| PaintRecipe {
        paint,
        width,
        height,
    })
}

/// Apply the base expression of `filter` to `image` in place
pub fn apply_base_filter(image: &mut RgbaImage, filter: FilterType) {
    for op in filter.preset().ops {
        match *op {
            FilterOp::Blur(sigma) => {
                if sigma > 0.0 && image.width() > 0 && image.height() > 0 {
                    *image = image::imageops::blur(image, sigma);
                }
            }
            op => apply_color_op(image, op),
        }
    }
}

/// Layer the filter's overlay paint over the whole of `image`
pub fn apply_overlay_paint(image: &mut RgbaImage, filter: FilterType) {
    if let Some(recipe) = overlay_paint_for(filter, image.width(), image.height()) {
        paint_rect(image, &recipe);
    }
}

/// Draw a paint recipe anchored at the top-left corner
pub fn paint_rect(image: &mut RgbaImage, recipe: &PaintRecipe) {
    let width = recipe.width.min(image.width());
    let height = recipe.height.min(image.height());
    let span = recipe.height.saturating_sub(1).max(1) as f32;
    for y in 0..height {
        let color = match recipe.paint.fill {
            Fill::Solid(color) => color,
            Fill::VerticalGradient { top, bottom } => {
                canvas::lerp_premultiplied(top, bottom, y as f32 / span)
            }
        };
        for x in 0..width {
            let dst = image.get_pixel_mut(x, y);
            *dst = canvas::blend(*dst, Rgba(color), recipe.paint.opacity, recipe.paint.blend);
        }
    }
}

/// 3x3 color matrix applied to linear 0..1 channel values
type ColorMatrix = [[f32; 3]; 3];

fn apply_color_op(image: &mut RgbaImage, op: FilterOp) {
    match op {
        FilterOp::Brightness(v) => map_channels(image, |c| c * v),
        FilterOp::Contrast(v) => map_channels(image, |c| (c - 0.5) * v + 0.5),
        FilterOp::Grayscale(amount) => apply_matrix(image, &grayscale_matrix(amount)),
        FilterOp::Sepia(amount) => apply_matrix(image, &sepia_matrix(amount)),
        FilterOp::Saturate(s) => apply_matrix(image, &saturate_matrix(s)),
        FilterOp::HueRotate(deg) => apply_matrix(image, &hue_rotate_matrix(deg)),
        FilterOp::Blur(_) => {}
    }
}

fn map_channels(image: &mut RgbaImage, f: impl Fn(f32) -> f32) {
    for pixel in image.pixels_mut() {
        for c in 0..3 {
            pixel[c] = to_byte(f(pixel[c] as f32 / 255.0));
        }
    }
}

fn apply_matrix(image: &mut RgbaImage, m: &ColorMatrix) {
    for pixel in image.pixels_mut() {
        let rgb = [
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        ];
        for (c, row) in m.iter().enumerate() {
            pixel[c] = to_byte(row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]);
        }
    }
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn grayscale_matrix(amount: f32) -> ColorMatrix {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
    ]
}

fn sepia_matrix(amount: f32) -> ColorMatrix {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ]
}

fn saturate_matrix(s: f32) -> ColorMatrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> ColorMatrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}
