// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content hashing — SHA-256 fingerprints of uploaded documents.

use certguard_core::error::CertguardError;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
///
/// Works on any bytes, decodable as an image or not, so an upload can always
/// be fingerprinted independently of its verdict.
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Verify that `data` matches a previously recorded SHA-256 hex digest.
///
/// The comparison ignores ASCII case so digests copied from other tools
/// still match.
pub fn verify_hash(data: &[u8], expected_hex: &str) -> Result<(), CertguardError> {
    let actual = hash_bytes(data);
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(CertguardError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}
