// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adaptive binarization — separates pen strokes from paper by comparing each
// pixel against the mean of its neighbourhood.

use image::{GrayImage, Luma};
use imageproc::integral_image::integral_image;
use tracing::{debug, instrument};

/// Foreground value written by `adaptive_threshold_inv`.
pub const FOREGROUND: u8 = 255;

/// Mean-based adaptive threshold with inverted output.
///
/// For each pixel the reference is the mean intensity of the
/// `(2 * block_radius + 1)` square centred on it, rounded to an integer.
/// Pixels with `value <= mean - bias` are dark relative to their
/// surroundings and become `FOREGROUND`; all others become 0.
///
/// Borders are handled by replicating the outermost row and column, so a
/// pixel near the edge is compared against a full-sized window.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn adaptive_threshold_inv(gray: &GrayImage, block_radius: u32, bias: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let padded = replicate_border(gray, block_radius);
    let integral = integral_image::<_, u64>(&padded);

    let side = 2 * block_radius + 1;
    let area = (side as u64 * side as u64) as f64;

    let output = GrayImage::from_fn(width, height, |x, y| {
        // Window in padded coordinates spans [x, x + side) x [y, y + side).
        let sum = integral.get_pixel(x + side, y + side).0[0] + integral.get_pixel(x, y).0[0]
            - integral.get_pixel(x, y + side).0[0]
            - integral.get_pixel(x + side, y).0[0];
        let mean = (sum as f64 / area).round() as i32;
        let value = gray.get_pixel(x, y).0[0] as i32;
        if value <= mean - bias {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    });

    debug!(block_radius, bias, "Adaptive threshold complete");
    output
}

/// Count non-zero pixels.
pub fn count_foreground(binary: &GrayImage) -> u32 {
    binary.pixels().filter(|p| p.0[0] != 0).count() as u32
}

/// Copy `gray` into a canvas enlarged by `radius` on every side, filling the
/// margin with the nearest edge pixel.
fn replicate_border(gray: &GrayImage, radius: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let r = radius as i64;
    GrayImage::from_fn(width + 2 * radius, height + 2 * radius, |x, y| {
        let sx = (x as i64 - r).clamp(0, width as i64 - 1) as u32;
        let sy = (y as i64 - r).clamp(0, height as i64 - 1) as u32;
        *gray.get_pixel(sx, sy)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_paper_has_no_ink() {
        let paper = GrayImage::from_pixel(40, 30, Luma([245u8]));
        let binary = adaptive_threshold_inv(&paper, 5, 2);
        assert_eq!(count_foreground(&binary), 0);
    }

    #[test]
    fn dark_stroke_becomes_foreground() {
        let mut img = GrayImage::from_pixel(60, 30, Luma([250u8]));
        for x in 10..50 {
            for y in 14..17 {
                img.put_pixel(x, y, Luma([20u8]));
            }
        }
        let binary = adaptive_threshold_inv(&img, 5, 2);

        // Every stroke pixel is far below its local mean.
        for x in 10..50 {
            for y in 14..17 {
                assert_eq!(binary.get_pixel(x, y).0[0], FOREGROUND, "({x}, {y})");
            }
        }
        // Paper next to the stroke is brighter than its local mean.
        assert_eq!(binary.get_pixel(30, 5).0[0], 0);
        assert_eq!(count_foreground(&binary), 40 * 3);
    }

    #[test]
    fn uniform_dark_region_is_not_ink() {
        // A flat dark image equals its own mean, which is above mean - bias.
        let img = GrayImage::from_pixel(20, 20, Luma([10u8]));
        assert_eq!(count_foreground(&adaptive_threshold_inv(&img, 5, 2)), 0);
    }

    #[test]
    fn negative_bias_marks_flat_regions() {
        let img = GrayImage::from_pixel(8, 8, Luma([128u8]));
        assert_eq!(count_foreground(&adaptive_threshold_inv(&img, 1, -1)), 64);
    }

    #[test]
    fn replicate_border_extends_edges() {
        let img = GrayImage::from_fn(2, 2, |x, y| Luma([(10 * (x + 2 * y)) as u8]));
        let padded = replicate_border(&img, 2);
        assert_eq!(padded.dimensions(), (6, 6));
        assert_eq!(padded.get_pixel(0, 0).0[0], 0);
        assert_eq!(padded.get_pixel(5, 0).0[0], 10);
        assert_eq!(padded.get_pixel(0, 5).0[0], 20);
        assert_eq!(padded.get_pixel(5, 5).0[0], 30);
    }

    #[test]
    fn tiny_image_does_not_panic() {
        let img = GrayImage::from_pixel(1, 1, Luma([0u8]));
        let binary = adaptive_threshold_inv(&img, 5, 2);
        assert_eq!(binary.dimensions(), (1, 1));
    }
}
