// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Certguard.

use thiserror::Error;

use crate::types::CheckKind;

/// Top-level error type for all Certguard operations.
///
/// A check that finds no evidence (no barcode, no ink, low logo score) is not
/// an error; it reports `CheckOutcome::Failed`. The variants here are the
/// cases where a verdict could not be computed at all, or where the service
/// itself could not start.
#[derive(Debug, Error)]
pub enum CertguardError {
    // -- Per-document errors --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("{check} check could not run: {message}")]
    Check { check: CheckKind, message: String },

    #[error("verification timed out after {millis} ms")]
    Timeout { millis: u64 },

    // -- Startup errors --
    #[error("configuration error: {0}")]
    Configuration(String),

    // -- Integrity --
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    // -- Storage / persistence --
    #[error("ledger storage error: {0}")]
    Storage(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CertguardError {
    /// Shorthand for a check that could not produce an outcome.
    pub fn check(check: CheckKind, message: impl Into<String>) -> Self {
        Self::Check {
            check,
            message: message.into(),
        }
    }

    /// Whether the error is fatal for the whole process rather than a single
    /// document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CertguardError>;
