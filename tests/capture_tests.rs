// SPDX-License-Identifier: MPL-2.0

//! Integration tests for cropping and photo capture

use image::{Rgba, RgbaImage};
use photobooth::pipelines::filters::FilterType;
use photobooth::pipelines::photo::{
    AspectRatio, CaptureSettings, capture_photo, center_crop, compose_photo,
};
use std::sync::Arc;

#[test]
fn test_crop_fits_source_and_ratio() {
    let sizes = [
        (1280, 720),
        (720, 1280),
        (640, 480),
        (1080, 1080),
        (1, 1),
        (1920, 1081),
        (333, 999),
    ];
    for (w, h) in sizes {
        for ratio in AspectRatio::ALL {
            let crop = center_crop(w, h, ratio.ratio());
            assert!(crop.sw <= w as f64 + 1e-9, "{}x{} {}", w, h, ratio);
            assert!(crop.sh <= h as f64 + 1e-9, "{}x{} {}", w, h, ratio);
            assert!(
                (crop.sw / crop.sh - ratio.ratio()).abs() < 1e-9,
                "{}x{} {}",
                w,
                h,
                ratio
            );
        }
    }
}

#[test]
fn test_crop_is_centered() {
    // Wider than 1:1: horizontal crop only
    let crop = center_crop(1280, 720, AspectRatio::Square.ratio());
    assert_eq!(crop.sy, 0.0);
    assert!((crop.sx - (1280.0 - crop.sw) / 2.0).abs() < 1e-9);

    // Taller than 4:5: vertical crop only
    let crop = center_crop(720, 1280, AspectRatio::Portrait.ratio());
    assert_eq!(crop.sx, 0.0);
    assert!((crop.sy - (1280.0 - crop.sh) / 2.0).abs() < 1e-9);
}

#[test]
fn test_matching_ratio_keeps_full_frame() {
    let crop = center_crop(1280, 720, AspectRatio::Widescreen.ratio());
    assert_eq!((crop.sx, crop.sy, crop.sw, crop.sh), (0.0, 0.0, 1280.0, 720.0));
}

#[test]
fn test_output_sizes() {
    assert_eq!(AspectRatio::Square.output_size(), (1080, 1080));
    assert_eq!(AspectRatio::Portrait.output_size(), (1080, 1350));
    assert_eq!(AspectRatio::Widescreen.output_size(), (1080, 608));
}

#[test]
fn test_overlay_follows_crop() {
    // 200x100 frame, 1:1 crop keeps columns 50..150
    let frame = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
    let mut overlay = RgbaImage::new(200, 100);
    for y in 0..100 {
        for x in 50..100 {
            overlay.put_pixel(x, y, Rgba([255, 0, 0, 255]));
        }
    }
    let settings = CaptureSettings {
        filter: FilterType::Normal,
        aspect_ratio: AspectRatio::Square,
    };
    let photo = compose_photo(&frame, Some(&overlay), settings).unwrap();
    assert_eq!(photo.dimensions(), (1080, 1080));
    // Left half of the photo is the red overlay band, right half stays black
    assert_eq!(photo.get_pixel(200, 300).0, [255, 0, 0, 255]);
    assert_eq!(photo.get_pixel(800, 300).0, [0, 0, 0, 255]);
}

#[test]
fn test_overlay_edges_do_not_darken_photo() {
    // White overlay over a white frame must stay white across its soft edge
    let frame = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
    let mut overlay = RgbaImage::new(100, 100);
    for y in 0..100 {
        for x in 0..50 {
            overlay.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    let settings = CaptureSettings {
        filter: FilterType::Normal,
        aspect_ratio: AspectRatio::Square,
    };
    let photo = compose_photo(&frame, Some(&overlay), settings).unwrap();
    let darkest = (0..1080).map(|x| photo.get_pixel(x, 500)[0]).min().unwrap();
    assert_eq!(darkest, 255);
}

#[test]
fn test_misaligned_overlay_does_not_fail_capture() {
    let frame = RgbaImage::from_pixel(64, 48, Rgba([10, 200, 10, 255]));
    let overlay = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
    let settings = CaptureSettings {
        filter: FilterType::Normal,
        aspect_ratio: AspectRatio::Widescreen,
    };
    let photo = compose_photo(&frame, Some(&overlay), settings).unwrap();
    assert_eq!(photo.get_pixel(10, 10).0, [10, 200, 10, 255]);
}

#[test]
fn test_empty_frame_is_rejected() {
    let settings = CaptureSettings::default();
    assert!(compose_photo(&RgbaImage::new(0, 10), None, settings).is_err());
}

#[tokio::test]
async fn test_capture_photo_produces_png() {
    let frame = Arc::new(RgbaImage::from_pixel(320, 240, Rgba([90, 120, 150, 255])));
    let settings = CaptureSettings {
        filter: FilterType::Clarendon,
        aspect_ratio: AspectRatio::Portrait,
    };
    let encoded = capture_photo(frame, None, settings).await.unwrap();
    assert_eq!((encoded.width, encoded.height), (1080, 1350));
    assert!(encoded.data_uri().starts_with("data:image/png;base64,"));

    let decoded = encoded.decode().unwrap();
    // Filter passes are uniform per row; only the watermark breaks that
    let differs = |x0: u32, x1: u32| {
        (1300..1350).any(|y| {
            let reference = decoded.get_pixel(100, y);
            (x0..x1).any(|x| decoded.get_pixel(x, y) != reference)
        })
    };
    assert!(differs(800, 1070), "watermark should be drawn bottom-right");
    assert!(!differs(0, 400), "nothing else is drawn on the left");
}
