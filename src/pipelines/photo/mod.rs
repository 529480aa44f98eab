// SPDX-License-Identifier: MPL-2.0

//! Photo capture pipeline
//!
//! Turns the current camera frame into one finished photo:
//!
//! ```text
//! Frame ─▶ center-crop ─▶ scale to export size ─▶ base filter
//!       ─▶ face overlay (same crop) ─▶ filter paint ─▶ watermark ─▶ PNG
//! ```
//!
//! Later steps are alpha-composited over earlier ones, so the order is fixed.
//! Composition and encoding run on the blocking pool.

pub mod crop;
pub mod encoding;

pub use crop::{CropRect, center_crop, crop_and_scale, crop_and_scale_layer};
pub use encoding::EncodedImage;

use crate::constants::{WATERMARK_TEXT, capture};
use crate::errors::PhotoError;
use crate::pipelines::canvas;
use crate::pipelines::filters::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Crop ratio of captured photos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 4:5
    #[serde(rename = "4:5")]
    Portrait,
    /// 16:9
    #[serde(rename = "16:9")]
    Widescreen,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Widescreen,
    ];

    /// Width divided by height
    pub fn ratio(self) -> f64 {
        match self {
            AspectRatio::Square => 1.0,
            AspectRatio::Portrait => 4.0 / 5.0,
            AspectRatio::Widescreen => 16.0 / 9.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "4:5",
            AspectRatio::Widescreen => "16:9",
        }
    }

    /// Export size: fixed width, height derived from the ratio
    pub fn output_size(self) -> (u32, u32) {
        let base = capture::EXPORT_BASE;
        (base, (base as f64 / self.ratio()).round() as u32)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.label() == s.trim())
            .ok_or_else(|| format!("unknown aspect ratio '{}' (expected 1:1, 4:5 or 16:9)", s))
    }
}

/// Filter and crop applied to a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureSettings {
    pub filter: FilterType,
    pub aspect_ratio: AspectRatio,
}

/// Compose one finished photo from `frame`
///
/// `overlay` is the face-effect surface. It is cut with the frame's crop
/// rectangle; a missing or mismatched surface only drops the AR layer.
pub fn compose_photo(
    frame: &RgbaImage,
    overlay: Option<&RgbaImage>,
    settings: CaptureSettings,
) -> Result<RgbaImage, PhotoError> {
    let (frame_width, frame_height) = frame.dimensions();
    if frame_width == 0 || frame_height == 0 {
        return Err(PhotoError::InvalidFrame {
            width: frame_width,
            height: frame_height,
        });
    }

    let (width, height) = settings.aspect_ratio.output_size();
    let crop = center_crop(frame_width, frame_height, settings.aspect_ratio.ratio());

    let mut photo = crop_and_scale(frame, crop, width, height);
    filters::apply_base_filter(&mut photo, settings.filter);

    match overlay {
        Some(surface) if surface.dimensions() == frame.dimensions() => {
            let layer = crop_and_scale_layer(surface, crop, width, height);
            canvas::composite(&mut photo, &layer, 1.0);
        }
        Some(surface) => {
            debug!(
                overlay = ?surface.dimensions(),
                frame = ?frame.dimensions(),
                "Overlay not aligned with frame, capturing without it"
            );
        }
        None => {}
    }

    filters::apply_overlay_paint(&mut photo, settings.filter);
    draw_watermark(&mut photo)?;
    Ok(photo)
}

/// Stamp the brand text bottom-right, outlined for legibility
pub fn draw_watermark(image: &mut RgbaImage) -> Result<(), PhotoError> {
    let fonts = canvas::fonts()?;
    let px = capture::WATERMARK_FONT_PX;
    let text_width = canvas::measure_text(&fonts.bold, px, WATERMARK_TEXT);
    let x = image.width() as f32 - text_width - capture::WATERMARK_MARGIN;
    let y = image.height() as f32 - capture::WATERMARK_MARGIN;
    canvas::draw_text_outlined(
        image,
        &fonts.bold,
        px,
        x,
        y,
        capture::WATERMARK_STROKE_PX,
        capture::WATERMARK_FILL,
        capture::WATERMARK_STROKE,
        WATERMARK_TEXT,
    );
    Ok(())
}

/// Capture a photo in the background and encode it
pub async fn capture_photo(
    frame: Arc<RgbaImage>,
    overlay: Option<Arc<RgbaImage>>,
    settings: CaptureSettings,
) -> Result<EncodedImage, PhotoError> {
    info!(
        width = frame.width(),
        height = frame.height(),
        filter = settings.filter.name(),
        aspect = %settings.aspect_ratio,
        "Capturing photo"
    );

    let encoded = tokio::task::spawn_blocking(move || {
        let photo = compose_photo(&frame, overlay.as_deref(), settings)?;
        encoding::encode_image(&photo)
    })
    .await
    .map_err(|e| PhotoError::TaskFailed(e.to_string()))??;

    info!(
        width = encoded.width,
        height = encoded.height,
        bytes = encoded.data.len(),
        "Photo captured"
    );
    Ok(encoded)
}
