// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Barcode presence check — looks for any machine-readable symbol (QR, Data
// Matrix, PDF417, EAN/UPC, Code 128, ...) using the `rxing` multi-format
// reader.

use certguard_core::error::Result;
use certguard_core::types::{CheckKind, CheckOutcome};
use image::RgbImage;
use tracing::{debug, instrument};

use super::DocumentCheck;
use crate::image::{DecodedImage, luma_bt601};

/// One decoded symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSymbol {
    /// Symbology name as reported by the reader.
    pub format: String,
    pub payload: String,
    /// Top-left-most corner of the symbol's reported points.
    pub position: (f32, f32),
}

/// Passes when at least one symbol decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarcodeCheck;

impl BarcodeCheck {
    pub fn new() -> Self {
        Self
    }

    /// Decode every symbol in `color`.
    ///
    /// Symbols are ordered top-to-bottom, then left-to-right, then by payload,
    /// so identical input always yields the same first payload. A reader
    /// that finds nothing is an empty result, not an error.
    #[instrument(skip_all, fields(width = color.width(), height = color.height()))]
    pub fn scan_symbols(&self, color: &RgbImage) -> Vec<DecodedSymbol> {
        let luma = luma_bt601(color);
        let (width, height) = luma.dimensions();

        let results = match rxing::helpers::detect_multiple_in_luma(luma.into_raw(), width, height) {
            Ok(results) => results,
            Err(err) => {
                debug!(error = ?err, "No symbols decoded");
                return Vec::new();
            }
        };

        let mut symbols: Vec<DecodedSymbol> = results
            .iter()
            .map(|result| {
                let position = result
                    .getPoints()
                    .iter()
                    .map(|p| (p.x, p.y))
                    .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.total_cmp(&b.0)))
                    .unwrap_or((0.0, 0.0));
                DecodedSymbol {
                    format: result.getBarcodeFormat().to_string(),
                    payload: result.getText().to_string(),
                    position,
                }
            })
            .collect();

        symbols.sort_by(|a, b| {
            a.position
                .1
                .total_cmp(&b.position.1)
                .then(a.position.0.total_cmp(&b.position.0))
                .then_with(|| a.payload.cmp(&b.payload))
        });

        debug!(count = symbols.len(), "Symbols decoded");
        symbols
    }
}

impl DocumentCheck for BarcodeCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Barcode
    }

    fn run(&self, image: &DecodedImage) -> Result<CheckOutcome> {
        let symbols = self.scan_symbols(image.color());
        Ok(match symbols.first() {
            Some(first) => CheckOutcome::Passed(format!("QR found: {}", first.payload)),
            None => CheckOutcome::Failed("No QR code found.".into()),
        })
    }
}
