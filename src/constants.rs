// SPDX-License-Identifier: MPL-2.0

//! Application-wide constants

use std::time::Duration;

/// Brand text stamped on every captured photo and strip footer
pub const WATERMARK_TEXT: &str = "PhotoBooth by namaku";

/// Title drawn in the strip header band
pub const STRIP_TITLE: &str = "PhotoBooth Studio";

/// Filename prefix for exported images
pub const DOWNLOAD_PREFIX: &str = "photobooth";

/// How long the capture flash stays visible
pub const FLASH_DURATION: Duration = Duration::from_millis(200);

/// Default render loop period (one display refresh at 60 Hz)
pub const DEFAULT_RENDER_INTERVAL_MS: u64 = 16;

/// Capture output settings
pub mod capture {
    /// Width of every exported photo; height follows the aspect ratio
    pub const EXPORT_BASE: u32 = 1080;

    /// Watermark inset from the bottom-right corner
    pub const WATERMARK_MARGIN: f32 = 20.0;
    /// Watermark font size in pixels (bold face)
    pub const WATERMARK_FONT_PX: f32 = 20.0;
    /// Watermark outline width in pixels
    pub const WATERMARK_STROKE_PX: u32 = 2;
    /// Watermark fill: white at 80%
    pub const WATERMARK_FILL: [u8; 4] = [255, 255, 255, 204];
    /// Watermark outline: black at 50%
    pub const WATERMARK_STROKE: [u8; 4] = [0, 0, 0, 128];
}

/// Fixed photo strip template
pub mod strip {
    /// Width of one photo cell
    pub const PHOTO_WIDTH: u32 = 400;
    /// Height of one photo cell
    pub const PHOTO_HEIGHT: u32 = 600;
    /// Outer padding around the photo area
    pub const PADDING: u32 = 20;
    /// Height of the dark title band
    pub const HEADER_HEIGHT: u32 = 60;
    /// Height of the light footer band
    pub const FOOTER_HEIGHT: u32 = 60;
    /// Gap between neighbouring cells
    pub const GAP: u32 = 10;

    pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
    pub const HEADER_COLOR: [u8; 4] = [0x1f, 0x29, 0x37, 255];
    pub const TITLE_COLOR: [u8; 4] = [255, 255, 255, 255];
    pub const TITLE_FONT_PX: f32 = 24.0;
    pub const BORDER_COLOR: [u8; 4] = [0x9c, 0xa3, 0xaf, 255];
    pub const BADGE_COLOR: [u8; 4] = [0, 0, 0, 153];
    pub const BADGE_TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];
    pub const BADGE_FONT_PX: f32 = 14.0;
    pub const FOOTER_COLOR: [u8; 4] = [0xf3, 0xf4, 0xf6, 255];
    pub const FOOTER_TEXT_COLOR: [u8; 4] = [0x6b, 0x72, 0x80, 255];
    pub const FOOTER_BRAND_FONT_PX: f32 = 14.0;
    pub const FOOTER_DATE_FONT_PX: f32 = 12.0;
}

/// Face effect tuning
pub mod effects {
    /// Smoothing ellipse radii relative to the landmark bounding box
    pub const SMOOTHING_RADIUS_X: f32 = 0.6;
    pub const SMOOTHING_RADIUS_Y: f32 = 0.7;
    /// Blur radius cap relative to the smaller frame dimension
    pub const SMOOTHING_MAX_BLUR: f32 = 0.02;
    pub const SMOOTHING_OPACITY: f32 = 0.9;

    pub const BLUSH_COLOR: [u8; 4] = [0xff, 0x6b, 0x6b, 255];
    pub const BLUSH_OPACITY: f32 = 0.25;
    pub const BLUSH_RADIUS: f32 = 0.06;
    pub const BLUSH_SQUASH: f32 = 0.6;

    pub const FRECKLE_COLOR: [u8; 4] = [120, 72, 48, 255];
    pub const FRECKLE_OPACITY: f32 = 0.65;
    pub const FRECKLES_PER_ANCHOR: usize = 8;
    /// Full spread of freckle offsets around an anchor, in pixels
    pub const FRECKLE_SPREAD_X: f32 = 16.0;
    pub const FRECKLE_SPREAD_Y: f32 = 12.0;
    pub const FRECKLE_MIN_RADIUS: f32 = 1.0;
    pub const FRECKLE_RADIUS_RANGE: f32 = 1.8;

    pub const FLOWER_COUNT: usize = 10;
    pub const FLOWER_SIZE: f32 = 0.04;
    pub const FLOWER_RING_MIN: f32 = 0.12;
    pub const FLOWER_RING_SPREAD: f32 = 0.05;
    pub const FLOWER_JITTER_PX: f32 = 20.0;

    pub const GLITTER_STARS_PER_AREA: usize = 16;
    pub const GLITTER_DRAW_PROBABILITY: f32 = 0.7;
    pub const GLITTER_FOREHEAD_LIFT: f32 = 0.06;
    pub const GLITTER_SPREAD_X: f32 = 40.0;
    pub const GLITTER_SPREAD_Y: f32 = 32.0;
    pub const GLITTER_MIN_RADIUS: f32 = 1.2;
    /// Largest star radius relative to the smaller frame dimension
    pub const GLITTER_MAX_RADIUS: f32 = 0.008;
    pub const STAR_CROSS_OPACITY: f32 = 0.85;
    pub const STAR_DIAGONAL_OPACITY: f32 = 0.6;
    pub const GLITTER_PALETTE: [[u8; 3]; 5] = [
        [0xff, 0xd9, 0x66],
        [0xff, 0xf1, 0xa6],
        [0xff, 0xff, 0xff],
        [0xff, 0xb3, 0xec],
        [0xa3, 0xe0, 0xff],
    ];
    pub const SPARKLE_OPACITY: f32 = 0.35;
    pub const SPARKLE_SPREAD_X: f32 = 42.0;
    pub const SPARKLE_SPREAD_Y: f32 = 34.0;
    pub const SPARKLE_MAX_RADIUS: f32 = 1.2;
}
