// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Template matching — zero-mean normalized cross-correlation (the correlation
// coefficient) of a template against every placement inside an image.
//
// For a placement (x, y) with window W and template T of n pixels:
//
//   score = sum((W - mean W) * (T - mean T))
//           / sqrt(sum((W - mean W)^2) * sum((T - mean T)^2))
//
// The numerator reduces to sum(W * T') with T' = T - mean T, and the window
// variance comes from integral images, so only the dot product is computed
// per pixel.

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image};
use imageproc::template_matching::find_extremes;
use tracing::{debug, instrument};

/// Windows with less variance than this are treated as flat.
const FLAT_VARIANCE_EPSILON: f64 = 1e-6;

/// Highest-scoring placement of a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    /// Correlation coefficient in `[-1, 1]`.
    pub score: f32,
    /// Top-left corner of the placement.
    pub location: (u32, u32),
}

/// Compute the similarity map of `template` over `image`.
///
/// The map has one entry per placement, `(W - w + 1) x (H - h + 1)`, with
/// values in `[-1, 1]`. Placements where either the window or the template
/// has no variance score 0. Returns `None` when the template is empty or
/// does not fit inside the image.
///
/// Rows of the map are split across the available cores.
#[instrument(
    skip_all,
    fields(
        image_w = image.width(),
        image_h = image.height(),
        template_w = template.width(),
        template_h = template.height()
    )
)]
pub fn match_template_normalized(image: &GrayImage, template: &GrayImage) -> Option<Image<Luma<f32>>> {
    let (img_w, img_h) = image.dimensions();
    let (tpl_w, tpl_h) = template.dimensions();
    if tpl_w == 0 || tpl_h == 0 || tpl_w > img_w || tpl_h > img_h {
        return None;
    }

    let out_w = img_w - tpl_w + 1;
    let out_h = img_h - tpl_h + 1;
    let n = (tpl_w as u64 * tpl_h as u64) as f64;

    // Zero-mean template and its energy.
    let tpl_mean = template.pixels().map(|p| p.0[0] as f64).sum::<f64>() / n;
    let centred: Vec<f32> = template
        .pixels()
        .map(|p| (p.0[0] as f64 - tpl_mean) as f32)
        .collect();
    let tpl_energy: f64 = centred.iter().map(|&v| v as f64 * v as f64).sum();

    let sums = integral_image::<_, u64>(image);
    let squares = integral_squared_image::<_, u64>(image);
    let window = |table: &Image<Luma<u64>>, x: u32, y: u32| -> f64 {
        (table.get_pixel(x + tpl_w, y + tpl_h).0[0] + table.get_pixel(x, y).0[0]
            - table.get_pixel(x, y + tpl_h).0[0]
            - table.get_pixel(x + tpl_w, y).0[0]) as f64
    };

    let pixels = image.as_raw();
    let stride = img_w as usize;
    let tw = tpl_w as usize;

    let mut scores = vec![0f32; out_w as usize * out_h as usize];

    let score_row = |y: u32, row: &mut [f32]| {
        for (x, slot) in (0..out_w).zip(row.iter_mut()) {
            let sum = window(&sums, x, y);
            let sum_sq = window(&squares, x, y);
            let win_energy = sum_sq - sum * sum / n;
            if win_energy <= FLAT_VARIANCE_EPSILON || tpl_energy <= FLAT_VARIANCE_EPSILON {
                *slot = 0.0;
                continue;
            }

            let mut dot = 0f64;
            for (ty, tpl_row) in centred.chunks_exact(tw).enumerate() {
                let start = (y as usize + ty) * stride + x as usize;
                let img_row = &pixels[start..start + tw];
                dot += img_row
                    .iter()
                    .zip(tpl_row)
                    .map(|(&p, &t)| p as f32 * t)
                    .sum::<f32>() as f64;
            }

            *slot = (dot / (win_energy * tpl_energy).sqrt()).clamp(-1.0, 1.0) as f32;
        }
    };

    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(out_h as usize)
        .max(1);
    let rows_per_worker = (out_h as usize).div_ceil(workers);

    std::thread::scope(|scope| {
        for (chunk_index, chunk) in scores
            .chunks_mut(rows_per_worker * out_w as usize)
            .enumerate()
        {
            let score_row = &score_row;
            scope.spawn(move || {
                let first_row = chunk_index * rows_per_worker;
                for (offset, row) in chunk.chunks_mut(out_w as usize).enumerate() {
                    score_row((first_row + offset) as u32, row);
                }
            });
        }
    });

    debug!(out_w, out_h, workers, "Similarity map computed");
    Image::from_raw(out_w, out_h, scores)
}

/// Find the best placement of `template` inside `image`.
///
/// Returns `None` under the same conditions as `match_template_normalized`.
pub fn best_match(image: &GrayImage, template: &GrayImage) -> Option<BestMatch> {
    let map = match_template_normalized(image, template)?;
    let extremes = find_extremes(&map);
    Some(BestMatch {
        score: extremes.max_value,
        location: extremes.max_value_location,
    })
}
