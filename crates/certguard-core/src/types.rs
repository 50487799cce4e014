// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Certguard verdicts and the verification ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall outcome of verifying one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Every check found its evidence.
    Verified,
    /// A barcode or signature is missing; the document is suspicious.
    Flagged,
    /// The logo is missing; treated as evidence of forgery.
    Rejected,
    /// The document could not be evaluated (undecodable, check error, timeout).
    Error,
}

impl VerificationStatus {
    /// Position in the severity order `Verified < Flagged < Rejected`.
    ///
    /// `Error` sits outside the order; it is only ever produced by a
    /// short-circuit, never by escalation, but ranks highest so that it can
    /// never be downgraded.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Verified => 0,
            Self::Flagged => 1,
            Self::Rejected => 2,
            Self::Error => 3,
        }
    }

    /// Return whichever of `self` and `other` is more severe.
    pub fn escalate(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    /// Stable string form used in the ledger and in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::Flagged => "Flagged",
            Self::Rejected => "Rejected",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Verified" => Ok(Self::Verified),
            "Flagged" => Ok(Self::Flagged),
            "Rejected" => Ok(Self::Rejected),
            "Error" => Ok(Self::Error),
            other => Err(format!("unknown verification status: {other}")),
        }
    }
}

/// The three visual checks, in the order their reasons are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckKind {
    Barcode,
    Signature,
    Logo,
}

impl CheckKind {
    /// Every check in reporting order.
    pub const ALL: [CheckKind; 3] = [Self::Barcode, Self::Signature, Self::Logo];

    /// Status a failure of this check escalates the verdict to.
    pub fn failure_status(&self) -> VerificationStatus {
        match self {
            Self::Barcode | Self::Signature => VerificationStatus::Flagged,
            Self::Logo => VerificationStatus::Rejected,
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Barcode => f.write_str("barcode"),
            Self::Signature => f.write_str("signature"),
            Self::Logo => f.write_str("logo"),
        }
    }
}

/// What a single check concluded, with its human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    Passed(String),
    Failed(String),
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Passed(reason) | Self::Failed(reason) => reason,
        }
    }

    pub fn into_reason(self) -> String {
        match self {
            Self::Passed(reason) | Self::Failed(reason) => reason,
        }
    }
}

/// The record returned to callers for every verification request.
///
/// Serializes as `{"status": "...", "reasons": [...], "hash": "..." | null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerificationStatus,
    pub reasons: Vec<String>,
    /// SHA-256 hex digest of the uploaded bytes; absent on `Error`.
    pub hash: Option<String>,
}

impl Verdict {
    /// An `Error` verdict carrying `message` as its only reason.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: VerificationStatus::Error,
            reasons: vec![message.into()],
            hash: None,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }
}

/// One persisted row of the verification ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub filename: String,
    /// Empty for `Error` verdicts, which carry no hash.
    pub doc_hash: String,
    pub status: VerificationStatus,
    pub reasons: Vec<String>,
    pub processed_at: DateTime<Utc>,
}
