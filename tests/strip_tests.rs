// SPDX-License-Identifier: MPL-2.0

//! Integration tests for photo strip assembly

use chrono::Utc;
use image::{Rgba, RgbaImage};
use photobooth::errors::StripError;
use photobooth::pipelines::photo::encoding::encode_image;
use photobooth::pipelines::strip::assemble_strip;
use photobooth::session::{PhotoStrip, StripPhoto};
use photobooth::storage::{DownloadKind, download_filename};

fn photo(index: usize, color: [u8; 4]) -> StripPhoto {
    let image = RgbaImage::from_pixel(108, 135, Rgba(color));
    StripPhoto {
        id: format!("p{}", index),
        image: encode_image(&image).unwrap(),
    }
}

fn strip_of(count: usize) -> PhotoStrip {
    let photos = (0..count)
        .map(|i| photo(i, [40 * i as u8, 100, 200, 255]))
        .collect();
    PhotoStrip::new(photos, Utc::now()).unwrap()
}

#[tokio::test]
async fn test_three_photo_column() {
    let encoded = assemble_strip(&strip_of(3)).await.unwrap();
    assert_eq!((encoded.width, encoded.height), (440, 60 + 600 * 3 + 10 * 2 + 60 + 40));
}

#[tokio::test]
async fn test_four_photo_grid() {
    let encoded = assemble_strip(&strip_of(4)).await.unwrap();
    assert_eq!((encoded.width, encoded.height), (400 * 2 + 10 + 40, 60 + 600 * 2 + 10 + 60 + 40));

    let image = encoded.decode().unwrap();
    // Fourth cell sits bottom-right
    assert_eq!(image.get_pixel(630, 990).0, [120, 100, 200, 255]);
}

#[tokio::test]
async fn test_same_strip_renders_identically() {
    let strip = strip_of(4);
    let first = assemble_strip(&strip).await.unwrap();
    let second = assemble_strip(&strip).await.unwrap();
    assert_eq!(first.decode().unwrap(), second.decode().unwrap());
}

#[tokio::test]
async fn test_one_bad_photo_aborts_strip() {
    let mut photos: Vec<StripPhoto> = (0..3).map(|i| photo(i, [255, 255, 255, 255])).collect();
    photos[2].image.data.truncate(10);
    let strip = PhotoStrip::new(photos, Utc::now()).unwrap();

    let err = assemble_strip(&strip).await.unwrap_err();
    assert!(matches!(err, StripError::ImageLoad { index: 2, .. }), "{:?}", err);
    assert_eq!(
        err.user_message(),
        "Failed to create the photo strip. Please try again."
    );
}

#[test]
fn test_strip_download_name() {
    let strip = strip_of(3);
    let name = download_filename(DownloadKind::Strip, strip.created_at());
    assert_eq!(
        name,
        format!("photobooth-strip-{}.png", strip.created_at().timestamp_millis())
    );
}
