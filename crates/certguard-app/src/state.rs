// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dashboard counters owned by the caller of the pipeline.

use std::fmt;
use std::time::Duration;

use certguard_core::types::VerificationStatus;
use serde::Serialize;

/// Time a manual review of one certificate is assumed to take.
pub const MANUAL_REVIEW: Duration = Duration::from_secs(120);

/// Running totals for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Documents processed.
    pub total: u64,
    /// Documents with a `Verified` verdict.
    pub verified: u64,
    /// Everything else, including `Error`.
    pub suspicious: u64,
    /// Reviewer minutes saved compared to checking by hand.
    pub minutes_saved: f64,
}

impl DashboardStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one verdict that took `elapsed` to produce.
    pub fn record(&mut self, status: VerificationStatus, elapsed: Duration) {
        self.total += 1;
        if status == VerificationStatus::Verified {
            self.verified += 1;
        } else {
            self.suspicious += 1;
        }
        self.minutes_saved += MANUAL_REVIEW.saturating_sub(elapsed).as_secs_f64() / 60.0;
    }
}

impl fmt::Display for DashboardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} | verified {} | suspicious {} | ~{:.1} min saved",
            self.total, self.verified, self.suspicious, self.minutes_saved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_count_as_suspicious() {
        let mut stats = DashboardStats::new();
        stats.record(VerificationStatus::Verified, Duration::from_secs(1));
        stats.record(VerificationStatus::Flagged, Duration::from_secs(1));
        stats.record(VerificationStatus::Rejected, Duration::from_secs(1));
        stats.record(VerificationStatus::Error, Duration::from_secs(1));
        assert_eq!((stats.total, stats.verified, stats.suspicious), (4, 1, 3));
    }

    #[test]
    fn minutes_saved_per_document() {
        let mut stats = DashboardStats::new();
        stats.record(VerificationStatus::Verified, Duration::from_secs(30));
        assert!((stats.minutes_saved - 1.5).abs() < 1e-9);
    }

    #[test]
    fn slow_verification_saves_nothing() {
        let mut stats = DashboardStats::new();
        stats.record(VerificationStatus::Flagged, Duration::from_secs(600));
        assert_eq!(stats.minutes_saved, 0.0);
        assert_eq!(stats.total, 1);
    }
}
