// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verification pipeline — decode, run the three checks, fold their outcomes
// into a verdict, and fingerprint the upload.
//
// Severity policy, applied in check order (barcode, signature, logo):
//   start at Verified
//   barcode fails    -> at least Flagged
//   signature fails  -> at least Flagged
//   logo fails       -> Rejected
// Status only ever moves towards Rejected. Any decode or check error replaces
// the whole verdict with Error, its message as the only reason, and no hash.

use certguard_core::config::{AppConfig, CheckThresholds};
use certguard_core::error::{CertguardError, Result};
use certguard_core::types::{CheckKind, CheckOutcome, Verdict, VerificationStatus};
use certguard_security::integrity::hash_bytes;
use tracing::{debug, info, instrument, warn};

use crate::checks::{BarcodeCheck, DocumentCheck, LogoCheck, SignatureCheck};
use crate::image::DecodedImage;

/// Fold check outcomes into a status and an ordered reasons list.
///
/// Reasons always come out in `CheckKind` order, whatever order the outcomes
/// arrive in.
pub fn aggregate(
    outcomes: impl IntoIterator<Item = (CheckKind, CheckOutcome)>,
) -> (VerificationStatus, Vec<String>) {
    let mut outcomes: Vec<_> = outcomes.into_iter().collect();
    outcomes.sort_by_key(|(kind, _)| *kind);

    let mut status = VerificationStatus::Verified;
    let mut reasons = Vec::with_capacity(outcomes.len());
    for (kind, outcome) in outcomes {
        if !outcome.passed() {
            status = status.escalate(kind.failure_status());
        }
        reasons.push(outcome.into_reason());
    }
    (status, reasons)
}

/// The document authenticity pipeline.
///
/// Holds the three checks, including the logo template loaded at
/// construction. A `Pipeline` cannot exist without a readable template, so
/// a missing asset stops the service before any request is accepted.
pub struct Pipeline {
    checks: Vec<Box<dyn DocumentCheck>>,
}

impl Pipeline {
    /// Build the pipeline from application configuration.
    ///
    /// Fails with `CertguardError::Configuration` when the thresholds are
    /// invalid or the logo template cannot be loaded.
    #[instrument(skip_all, fields(logo = %config.logo_template_path.display()))]
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.thresholds.validate()?;
        let logo = LogoCheck::load(&config.logo_template_path, config.thresholds.logo_min_score)?;
        info!("verification pipeline ready");
        Ok(Self::from_logo(logo, &config.thresholds))
    }

    /// Build the pipeline around an already-loaded logo check.
    pub fn from_logo(logo: LogoCheck, thresholds: &CheckThresholds) -> Self {
        Self::with_checks(vec![
            Box::new(BarcodeCheck::new()),
            Box::new(SignatureCheck::new(thresholds)),
            Box::new(logo),
        ])
    }

    pub(crate) fn with_checks(checks: Vec<Box<dyn DocumentCheck>>) -> Self {
        Self { checks }
    }

    /// Verify one upload.
    ///
    /// `filename` is recorded in logs only; it never influences the verdict.
    /// Errors never escape: they become an `Error` verdict. The content hash
    /// is attached only when every check ran; callers that need a fingerprint
    /// of an undecodable upload call `hash_bytes` themselves.
    #[instrument(skip_all, fields(%filename, data_len = data.len()))]
    pub fn verify(&self, data: &[u8], filename: &str) -> Verdict {
        match self.evaluate(data) {
            Ok((status, reasons)) => {
                let hash = hash_bytes(data);
                info!(%status, %hash, "Document verified");
                Verdict {
                    status,
                    reasons,
                    hash: Some(hash),
                }
            }
            Err(err) => {
                warn!(error = %err, "Document could not be verified");
                Verdict::error(err.to_string())
            }
        }
    }

    /// Decode `data` and run every check, without hashing.
    pub fn evaluate(&self, data: &[u8]) -> Result<(VerificationStatus, Vec<String>)> {
        let image = DecodedImage::from_bytes(data)?;
        self.evaluate_image(&image)
    }

    /// Run every check against an already-decoded image.
    ///
    /// Checks run concurrently on scoped threads. The first error in check
    /// order wins; a panicking check counts as an error.
    pub fn evaluate_image(&self, image: &DecodedImage) -> Result<(VerificationStatus, Vec<String>)> {
        let mut results: Vec<(CheckKind, Result<CheckOutcome>)> = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .checks
                .iter()
                .map(|check| (check.kind(), scope.spawn(move || check.run(image))))
                .collect();

            handles
                .into_iter()
                .map(|(kind, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or_else(|_| Err(CertguardError::check(kind, "check panicked")));
                    (kind, result)
                })
                .collect()
        });
        results.sort_by_key(|(kind, _)| *kind);

        let mut outcomes = Vec::with_capacity(results.len());
        for (kind, result) in results {
            let outcome = result?;
            debug!(check = %kind, passed = outcome.passed(), reason = outcome.reason(), "Check finished");
            outcomes.push((kind, outcome));
        }
        Ok(aggregate(outcomes))
    }
}
