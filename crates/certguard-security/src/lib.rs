// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! certguard-security — fingerprints and audit trail for verified documents.
//!
//! Every upload is fingerprinted with SHA-256 before its verdict is stored,
//! and every verdict lands in an append-only SQLite ledger so that a later
//! dispute can be traced back to the exact bytes that were judged.

pub mod integrity;
pub mod ledger;

pub use integrity::{hash_bytes, verify_hash};
pub use ledger::VerificationLedger;
