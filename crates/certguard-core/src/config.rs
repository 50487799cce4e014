// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration and the tunable check thresholds.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CertguardError, Result};

/// Default number of rows returned by a "recent verifications" query.
pub const DEFAULT_RECENT_LIMIT: u32 = 20;

/// Largest accepted `signature_block_radius` (a 129x129 neighbourhood).
pub const MAX_BLOCK_RADIUS: u32 = 64;

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Reference logo template, loaded once at startup.
    pub logo_template_path: PathBuf,
    /// Record every verdict in the verification ledger.
    pub ledger_enabled: bool,
    /// Upper bound on a single verification, in milliseconds. `0` disables it.
    pub verify_timeout_ms: u64,
    /// Rows returned by `recent` when no limit is given.
    pub recent_limit: u32,
    /// Heuristic thresholds for the visual checks.
    pub thresholds: CheckThresholds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logo_template_path: PathBuf::from("logo_template.png"),
            ledger_enabled: true,
            verify_timeout_ms: 30_000,
            recent_limit: DEFAULT_RECENT_LIMIT,
            thresholds: CheckThresholds::default(),
        }
    }
}

impl AppConfig {
    /// Reject settings the checks cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.recent_limit == 0 {
            return Err(CertguardError::Configuration(
                "recent_limit must be at least 1".into(),
            ));
        }
        self.thresholds.validate()
    }
}

/// Layout assumptions and cutoffs for the signature and logo checks.
///
/// The defaults describe the standard certificate layout: the signature sits
/// in the bottom-right corner and the issuer logo is reproduced faithfully
/// enough to correlate at 0.8 or better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckThresholds {
    /// Signature region starts at this fraction of the image height.
    pub signature_row_fraction: f64,
    /// Signature region starts at this fraction of the image width.
    pub signature_col_fraction: f64,
    /// Pixels excluded from the bottom and right edges of the signature region.
    pub signature_margin: u32,
    /// Radius of the adaptive threshold neighbourhood (5 gives an 11x11 block).
    pub signature_block_radius: u32,
    /// Constant subtracted from the local mean before comparing.
    pub signature_bias: i32,
    /// Minimum ink pixels for the signature to count as present.
    pub signature_min_ink_pixels: u32,
    /// Minimum normalized cross-correlation for the logo to count as present.
    pub logo_min_score: f32,
}

impl Default for CheckThresholds {
    fn default() -> Self {
        Self {
            signature_row_fraction: 0.8,
            signature_col_fraction: 0.6,
            signature_margin: 20,
            signature_block_radius: 5,
            signature_bias: 2,
            signature_min_ink_pixels: 100,
            logo_min_score: 0.8,
        }
    }
}

impl CheckThresholds {
    pub fn validate(&self) -> Result<()> {
        for (name, fraction) in [
            ("signature_row_fraction", self.signature_row_fraction),
            ("signature_col_fraction", self.signature_col_fraction),
        ] {
            if !(0.0..1.0).contains(&fraction) {
                return Err(CertguardError::Configuration(format!(
                    "{name} must be in [0, 1), got {fraction}"
                )));
            }
        }
        if self.signature_block_radius > MAX_BLOCK_RADIUS {
            return Err(CertguardError::Configuration(format!(
                "signature_block_radius must be at most {MAX_BLOCK_RADIUS}, got {}",
                self.signature_block_radius
            )));
        }
        if !(-1.0..=1.0).contains(&self.logo_min_score) {
            return Err(CertguardError::Configuration(format!(
                "logo_min_score must be in [-1, 1], got {}",
                self.logo_min_score
            )));
        }
        Ok(())
    }
}
