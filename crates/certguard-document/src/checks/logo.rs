// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logo match check — correlates the issuer's reference logo against the whole
// page and accepts the document when the best placement is close enough.

use std::path::Path;
use std::sync::Arc;

use certguard_core::error::{CertguardError, Result};
use certguard_core::types::{CheckKind, CheckOutcome};
use image::GrayImage;
use tracing::{debug, info, instrument};

use super::DocumentCheck;
use crate::image::{DecodedImage, luma_bt601};
use crate::scan::correlate::{BestMatch, best_match};

/// Passes when the reference logo correlates with some part of the page at
/// `min_score` or better.
///
/// The template is loaded once and shared read-only; cloning the check is
/// cheap.
#[derive(Debug, Clone)]
pub struct LogoCheck {
    template: Arc<GrayImage>,
    min_score: f32,
}

impl LogoCheck {
    /// Load the reference logo from `path`.
    ///
    /// A missing or unreadable template is a `CertguardError::Configuration`:
    /// the service must not start without it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>, min_score: f32) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CertguardError::Configuration(format!(
                "logo template {} missing",
                path.display()
            )));
        }

        let img = image::open(path).map_err(|err| {
            CertguardError::Configuration(format!(
                "logo template {} unreadable: {}",
                path.display(),
                err
            ))
        })?;

        let template = luma_bt601(&img.to_rgb8());
        info!(
            width = template.width(),
            height = template.height(),
            "Logo template loaded"
        );
        Self::from_template(template, min_score)
    }

    /// Use an already-prepared luminance template.
    ///
    /// A template of a single flat intensity has no pattern to correlate
    /// against and is rejected.
    pub fn from_template(template: GrayImage, min_score: f32) -> Result<Self> {
        if template.width() == 0 || template.height() == 0 {
            return Err(CertguardError::Configuration(
                "logo template has zero extent".into(),
            ));
        }
        let first = template.get_pixel(0, 0).0[0];
        if template.pixels().all(|p| p.0[0] == first) {
            return Err(CertguardError::Configuration(format!(
                "logo template is a flat image (every pixel is {first})"
            )));
        }
        Ok(Self {
            template: Arc::new(template),
            min_score,
        })
    }

    pub fn template(&self) -> &GrayImage {
        &self.template
    }

    /// Best correlation of the template anywhere on `gray`.
    ///
    /// Errors when the template is larger than the page, since no placement
    /// exists to score.
    pub fn best_match(&self, gray: &GrayImage) -> Result<BestMatch> {
        best_match(gray, &self.template).ok_or_else(|| {
            CertguardError::check(
                CheckKind::Logo,
                format!(
                    "template ({}x{}) is larger than the document ({}x{})",
                    self.template.width(),
                    self.template.height(),
                    gray.width(),
                    gray.height()
                ),
            )
        })
    }
}

impl DocumentCheck for LogoCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Logo
    }

    fn run(&self, image: &DecodedImage) -> Result<CheckOutcome> {
        let best = self.best_match(image.gray())?;
        debug!(
            score = best.score,
            x = best.location.0,
            y = best.location.1,
            min_score = self.min_score,
            "Logo correlation"
        );
        Ok(if best.score >= self.min_score {
            CheckOutcome::Passed("Logo detected.".into())
        } else {
            CheckOutcome::Failed("Logo not found.".into())
        })
    }
}
