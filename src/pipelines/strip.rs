// SPDX-License-Identifier: MPL-2.0

//! Photo strip assembly
//!
//! Lays 3 or 4 captured photos into one image with a title band, numbered
//! cells and a footer carrying the brand and the strip date. Geometry is
//! fixed, so the same strip always renders the same pixels.

use super::canvas::{self, TextAlign};
use super::photo::{EncodedImage, encoding};
use crate::constants::strip::*;
use crate::constants::{STRIP_TITLE, WATERMARK_TEXT};
use crate::errors::StripError;
use crate::session::PhotoStrip;
use chrono::{DateTime, Local, Utc};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::{debug, error, info};

/// Cell arrangement, chosen from the photo count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripLayout {
    /// One column of three photos
    Column,
    /// Two by two grid
    Grid,
}

impl StripLayout {
    pub fn for_count(count: usize) -> Result<Self, StripError> {
        match count {
            3 => Ok(StripLayout::Column),
            4 => Ok(StripLayout::Grid),
            other => Err(StripError::UnsupportedCount(other)),
        }
    }

    /// Full canvas size in pixels
    pub fn canvas_size(self) -> (u32, u32) {
        let chrome = HEADER_HEIGHT + FOOTER_HEIGHT + PADDING * 2;
        match self {
            StripLayout::Column => (
                PHOTO_WIDTH + PADDING * 2,
                chrome + PHOTO_HEIGHT * 3 + GAP * 2,
            ),
            StripLayout::Grid => (
                PHOTO_WIDTH * 2 + GAP + PADDING * 2,
                chrome + PHOTO_HEIGHT * 2 + GAP,
            ),
        }
    }

    /// Top-left corner of the cell holding photo `index` (0-based)
    pub fn cell_origin(self, index: usize) -> (u32, u32) {
        let index = index as u32;
        let (col, row) = match self {
            StripLayout::Column => (0, index),
            StripLayout::Grid => (index % 2, index / 2),
        };
        (
            PADDING + col * (PHOTO_WIDTH + GAP),
            HEADER_HEIGHT + PADDING + row * (PHOTO_HEIGHT + GAP),
        )
    }
}

/// Date shown in the strip footer (day/month/year, local time)
pub fn footer_date(created_at: DateTime<Utc>) -> String {
    created_at
        .with_timezone(&Local)
        .format("%-d/%-m/%Y")
        .to_string()
}

/// Draw the strip from already decoded photos
pub fn render_strip(photos: &[RgbaImage], date: &str) -> Result<RgbaImage, StripError> {
    let layout = StripLayout::for_count(photos.len())?;
    let fonts = canvas::fonts().map_err(|e| StripError::EncodingFailed(e.to_string()))?;
    let (width, height) = layout.canvas_size();
    let center_x = width as f32 / 2.0;

    let mut strip = RgbaImage::from_pixel(width, height, Rgba(BACKGROUND));

    canvas::fill_rect(&mut strip, 0, 0, width, HEADER_HEIGHT, HEADER_COLOR);
    canvas::draw_text(
        &mut strip,
        &fonts.bold,
        TITLE_FONT_PX,
        center_x,
        (HEADER_HEIGHT / 2 + 8) as f32,
        TextAlign::Center,
        TITLE_COLOR,
        STRIP_TITLE,
    );

    for (index, photo) in photos.iter().enumerate() {
        let (x, y) = layout.cell_origin(index);
        let (x, y) = (x as i32, y as i32);
        canvas::stroke_rect(&mut strip, x, y, PHOTO_WIDTH, PHOTO_HEIGHT, 2, BORDER_COLOR);

        if photo.dimensions() == (PHOTO_WIDTH, PHOTO_HEIGHT) {
            imageops::overlay(&mut strip, photo, x as i64, y as i64);
        } else {
            let cell = imageops::resize(photo, PHOTO_WIDTH, PHOTO_HEIGHT, FilterType::Triangle);
            imageops::overlay(&mut strip, &cell, x as i64, y as i64);
        }

        canvas::fill_rect(&mut strip, x + 5, y + 5, 30, 25, BADGE_COLOR);
        canvas::draw_text(
            &mut strip,
            &fonts.bold,
            BADGE_FONT_PX,
            (x + 20) as f32,
            (y + 22) as f32,
            TextAlign::Center,
            BADGE_TEXT_COLOR,
            &(index + 1).to_string(),
        );
    }

    let footer_y = height - FOOTER_HEIGHT;
    canvas::fill_rect(&mut strip, 0, footer_y as i32, width, FOOTER_HEIGHT, FOOTER_COLOR);
    canvas::draw_text(
        &mut strip,
        &fonts.regular,
        FOOTER_BRAND_FONT_PX,
        center_x,
        (footer_y + 25) as f32,
        TextAlign::Center,
        FOOTER_TEXT_COLOR,
        WATERMARK_TEXT,
    );
    canvas::draw_text(
        &mut strip,
        &fonts.regular,
        FOOTER_DATE_FONT_PX,
        center_x,
        (footer_y + 45) as f32,
        TextAlign::Center,
        FOOTER_TEXT_COLOR,
        date,
    );

    Ok(strip)
}

/// Decode one strip photo on the blocking pool
async fn load_photo(index: usize, image: EncodedImage) -> Result<RgbaImage, StripError> {
    tokio::task::spawn_blocking(move || image.decode())
        .await
        .map_err(|e| StripError::ImageLoad {
            index,
            reason: e.to_string(),
        })?
        .map_err(|reason| StripError::ImageLoad { index, reason })
}

/// Assemble `strip` into one encoded image
///
/// All photos are decoded concurrently and must all succeed; the first
/// failure aborts the whole strip and nothing is drawn.
pub async fn assemble_strip(strip: &PhotoStrip) -> Result<EncodedImage, StripError> {
    let count = strip.photos().len();
    StripLayout::for_count(count)?;
    info!(id = strip.id(), photos = count, "Assembling photo strip");

    let loads = strip
        .photos()
        .iter()
        .enumerate()
        .map(|(index, photo)| load_photo(index, photo.image.clone()));
    let photos = futures::future::try_join_all(loads).await.map_err(|e| {
        error!(id = strip.id(), error = %e, "Photo strip aborted");
        e
    })?;
    debug!(photos = photos.len(), "Strip photos decoded");

    let date = footer_date(strip.created_at());
    let encoded = tokio::task::spawn_blocking(move || {
        let image = render_strip(&photos, &date)?;
        encoding::encode_image(&image).map_err(|e| StripError::EncodingFailed(e.to_string()))
    })
    .await
    .map_err(|e| StripError::EncodingFailed(e.to_string()))??;

    info!(
        id = strip.id(),
        width = encoded.width,
        height = encoded.height,
        "Photo strip assembled"
    );
    Ok(encoded)
}
