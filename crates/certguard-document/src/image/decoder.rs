// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image decoder — turns uploaded bytes into the color and luminance planes
// every check reads from. Uses the `image` crate for codecs.

use certguard_core::error::CertguardError;
use image::{DynamicImage, GrayImage, Luma, RgbImage};
use tracing::{debug, instrument};

/// A decoded upload, held as two planes of identical dimensions.
///
/// Built once per request and shared read-only by all checks.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    color: RgbImage,
    gray: GrayImage,
}

impl DecodedImage {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (JPEG, PNG, ...).
    ///
    /// Fails with `CertguardError::Decode` for an empty buffer, a corrupt or
    /// unrecognised header, or an image with a zero dimension.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, CertguardError> {
        if data.is_empty() {
            return Err(CertguardError::Decode("empty buffer".into()));
        }

        let img = image::load_from_memory(data)
            .map_err(|err| CertguardError::Decode(err.to_string()))?;
        Self::from_dynamic(img)
    }

    /// Wrap an already-decoded `DynamicImage`.
    ///
    /// An alpha channel, if present, is dropped rather than composited.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self, CertguardError> {
        if img.width() == 0 || img.height() == 0 {
            return Err(CertguardError::Decode(format!(
                "image has zero extent ({}x{})",
                img.width(),
                img.height()
            )));
        }

        let had_alpha = img.color().has_alpha();
        let color = img.to_rgb8();
        let gray = luma_bt601(&color);
        debug!(
            width = color.width(),
            height = color.height(),
            had_alpha,
            "Image decoded"
        );
        Ok(Self { color, gray })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }

    /// Full-color plane.
    pub fn color(&self) -> &RgbImage {
        &self.color
    }

    /// Single-channel luminance plane.
    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }
}

/// Convert RGB to luminance with the ITU-R BT.601 weights.
///
/// Document logos are prepared with the same conversion, so the template
/// and the upload agree pixel for pixel.
pub fn luma_bt601(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        Luma([luma as u8])
    })
}
