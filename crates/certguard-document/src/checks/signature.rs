// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signature presence check — counts ink in the bottom-right region of the
// page, where the standard certificate layout places the handwritten
// signature.

use certguard_core::config::CheckThresholds;
use certguard_core::error::Result;
use certguard_core::types::{CheckKind, CheckOutcome};
use image::GrayImage;
use image::imageops::crop_imm;
use tracing::{debug, instrument};

use super::DocumentCheck;
use crate::image::DecodedImage;
use crate::scan::threshold::{adaptive_threshold_inv, count_foreground};

/// Rectangle of the page searched for a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Passes when the signature region holds enough locally dark pixels.
#[derive(Debug, Clone)]
pub struct SignatureCheck {
    row_fraction: f64,
    col_fraction: f64,
    margin: u32,
    block_radius: u32,
    bias: i32,
    min_ink_pixels: u32,
}

impl Default for SignatureCheck {
    fn default() -> Self {
        Self::new(&CheckThresholds::default())
    }
}

impl SignatureCheck {
    pub fn new(thresholds: &CheckThresholds) -> Self {
        Self {
            row_fraction: thresholds.signature_row_fraction,
            col_fraction: thresholds.signature_col_fraction,
            margin: thresholds.signature_margin,
            block_radius: thresholds.signature_block_radius,
            bias: thresholds.signature_bias,
            min_ink_pixels: thresholds.signature_min_ink_pixels,
        }
    }

    /// Signature region for a `width` x `height` page.
    ///
    /// Rows `[floor(0.8 H), H - margin)` and columns `[floor(0.6 W),
    /// W - margin)` with the default thresholds. `None` when the page is too
    /// small for the region to have positive extent.
    pub fn region(&self, width: u32, height: u32) -> Option<Region> {
        if width <= self.margin || height <= self.margin {
            return None;
        }
        let y = (height as f64 * self.row_fraction).floor() as u32;
        let x = (width as f64 * self.col_fraction).floor() as u32;
        let bottom = height - self.margin;
        let right = width - self.margin;
        if y >= bottom || x >= right {
            return None;
        }
        Some(Region {
            x,
            y,
            width: right - x,
            height: bottom - y,
        })
    }

    /// Number of ink pixels inside the signature region, or `None` when the
    /// page has no usable region.
    #[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
    pub fn ink_pixels(&self, gray: &GrayImage) -> Option<u32> {
        let region = self.region(gray.width(), gray.height())?;
        let roi = crop_imm(gray, region.x, region.y, region.width, region.height).to_image();
        let binary = adaptive_threshold_inv(&roi, self.block_radius, self.bias);
        let ink = count_foreground(&binary);
        debug!(?region, ink, "Signature region analysed");
        Some(ink)
    }
}

impl DocumentCheck for SignatureCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Signature
    }

    fn run(&self, image: &DecodedImage) -> Result<CheckOutcome> {
        let present = self
            .ink_pixels(image.gray())
            .is_some_and(|ink| ink >= self.min_ink_pixels);
        Ok(if present {
            CheckOutcome::Passed("Signature present.".into())
        } else {
            CheckOutcome::Failed("Signature missing.".into())
        })
    }
}
