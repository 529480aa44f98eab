// SPDX-License-Identifier: MPL-2.0

//! Flowers and glitter

use super::{FaceAnchors, jitter};
use crate::backends::landmarks::FaceRegion;
use crate::constants::effects::*;
use crate::pipelines::canvas;
use image::RgbaImage;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Petal and heart colors of one blossom kind
struct Blossom {
    petals: usize,
    petal: [u8; 4],
    heart: [u8; 4],
}

/// Blossom kinds, used in rotation around the face
const BLOSSOMS: [Blossom; 5] = [
    // Yellow daisy
    Blossom {
        petals: 8,
        petal: [255, 214, 10, 255],
        heart: [255, 150, 0, 255],
    },
    // Cherry blossom
    Blossom {
        petals: 5,
        petal: [255, 183, 197, 255],
        heart: [255, 105, 180, 255],
    },
    // White flower
    Blossom {
        petals: 6,
        petal: [255, 250, 250, 255],
        heart: [240, 128, 170, 255],
    },
    // Sunflower
    Blossom {
        petals: 12,
        petal: [255, 200, 0, 255],
        heart: [120, 72, 20, 255],
    },
    // Tulip
    Blossom {
        petals: 3,
        petal: [235, 60, 100, 255],
        heart: [200, 30, 80, 255],
    },
];

/// Ten blossoms on a ring around the face center
pub fn draw_flowers<R: Rng>(surface: &mut RgbaImage, anchors: &FaceAnchors<'_>, rng: &mut R) -> bool {
    let Some((cx, cy)) = anchors.pixel(FaceRegion::FaceCenter) else {
        return false;
    };
    let max_dim = anchors.max_dimension();
    let size = (max_dim * FLOWER_SIZE).round();

    for i in 0..FLOWER_COUNT {
        let angle = i as f32 / FLOWER_COUNT as f32 * TAU;
        let radius = max_dim * (FLOWER_RING_MIN + rng.random::<f32>() * FLOWER_RING_SPREAD);
        let x = cx + angle.cos() * radius + jitter(rng, FLOWER_JITTER_PX);
        let y = cy + angle.sin() * radius + jitter(rng, FLOWER_JITTER_PX);
        let rotation = jitter(rng, PI) / 8.0;
        draw_blossom(surface, &BLOSSOMS[i % BLOSSOMS.len()], (x, y), size, rotation);
    }
    true
}

/// One blossom in a `size` pixel glyph cell whose baseline-left corner is `origin`
fn draw_blossom(surface: &mut RgbaImage, blossom: &Blossom, origin: (f32, f32), size: f32, rotation: f32) {
    let (sin, cos) = rotation.sin_cos();
    // Glyph center sits half a cell right of and above the baseline origin
    let (ox, oy) = (size * 0.5, -size * 0.4);
    let center = (origin.0 + ox * cos - oy * sin, origin.1 + ox * sin + oy * cos);

    let petal_radius = size * 0.2;
    let petal_offset = size * 0.26;
    for k in 0..blossom.petals {
        let a = rotation + k as f32 / blossom.petals as f32 * TAU - FRAC_PI_2;
        let petal = (center.0 + a.cos() * petal_offset, center.1 + a.sin() * petal_offset);
        canvas::fill_circle(surface, petal, petal_radius, blossom.petal);
    }
    canvas::fill_circle(surface, center, size * 0.14, blossom.heart);
}

/// Four-pointed stars on both cheeks and above the forehead, plus faint dots
pub fn draw_glitter<R: Rng>(surface: &mut RgbaImage, anchors: &FaceAnchors<'_>, rng: &mut R) -> bool {
    let (Some(left), Some(right), Some(forehead)) = (
        anchors.pixel(FaceRegion::LeftCheek),
        anchors.pixel(FaceRegion::RightCheek),
        anchors.pixel(FaceRegion::Forehead),
    ) else {
        return false;
    };
    let lift = anchors.height() as f32 * GLITTER_FOREHEAD_LIFT;
    let areas = [left, right, (forehead.0, forehead.1 - lift)];
    let max_radius = anchors.min_dimension() * GLITTER_MAX_RADIUS;

    for (ax, ay) in areas {
        for _ in 0..GLITTER_STARS_PER_AREA {
            let radius = (rng.random::<f32>() * max_radius).max(GLITTER_MIN_RADIUS);
            let x = ax + jitter(rng, GLITTER_SPREAD_X);
            let y = ay + jitter(rng, GLITTER_SPREAD_Y);
            let [r, g, b] = GLITTER_PALETTE[rng.random_range(0..GLITTER_PALETTE.len())];
            // Flicker: each star only shows on some ticks
            if rng.random::<f32>() < GLITTER_DRAW_PROBABILITY {
                let rotation = rng.random::<f32>() * FRAC_PI_2;
                draw_star(surface, (x, y), radius, rotation, [r, g, b]);
            }
        }
    }

    let mut sparkle = RgbaImage::new(surface.width(), surface.height());
    for _ in 0..GLITTER_STARS_PER_AREA * 2 {
        let (ax, ay) = areas[rng.random_range(0..areas.len())];
        let x = ax + jitter(rng, SPARKLE_SPREAD_X);
        let y = ay + jitter(rng, SPARKLE_SPREAD_Y);
        let radius = rng.random::<f32>() * SPARKLE_MAX_RADIUS;
        canvas::fill_circle(&mut sparkle, (x, y), radius, [255, 255, 255, 255]);
    }
    canvas::composite(surface, &sparkle, SPARKLE_OPACITY);
    true
}

/// A cross with fainter, shorter diagonals
fn draw_star(surface: &mut RgbaImage, center: (f32, f32), radius: f32, rotation: f32, rgb: [u8; 3]) {
    let line_width = (radius * 0.15).max(0.8);
    let (sin, cos) = rotation.sin_cos();
    let at = |dx: f32, dy: f32| (center.0 + dx * cos - dy * sin, center.1 + dx * sin + dy * cos);
    let alpha = |opacity: f32| (opacity * 255.0).round() as u8;

    let cross = [rgb[0], rgb[1], rgb[2], alpha(STAR_CROSS_OPACITY)];
    canvas::stroke_line(surface, at(-radius, 0.0), at(radius, 0.0), line_width, cross);
    canvas::stroke_line(surface, at(0.0, -radius), at(0.0, radius), line_width, cross);

    let d = radius * 0.7;
    let diagonal = [rgb[0], rgb[1], rgb[2], alpha(STAR_DIAGONAL_OPACITY)];
    canvas::stroke_line(surface, at(-d, -d), at(d, d), line_width, diagonal);
    canvas::stroke_line(surface, at(d, -d), at(-d, d), line_width, diagonal);
}
