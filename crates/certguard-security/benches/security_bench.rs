// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for content hashing and ledger writes in the
// certguard-security crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use certguard_core::VerificationStatus;
use certguard_security::{VerificationLedger, hash_bytes};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark SHA-256 content hashing at typical upload sizes.
///
/// Sizes: 100 KiB (compressed JPEG scan) up to 8 MiB (high-resolution PNG).
fn bench_content_hash(c: &mut Criterion) {
    let sizes: &[(&str, usize)] = &[
        ("100 KiB", 100 * 1024),
        ("1 MiB", 1024 * 1024),
        ("8 MiB", 8 * 1024 * 1024),
    ];

    let mut group = c.benchmark_group("content_hash_sha256");
    for &(label, size) in sizes {
        let data = vec![0xABu8; size];
        group.bench_function(label, |b| {
            b.iter(|| black_box(hash_bytes(black_box(&data))));
        });
    }
    group.finish();
}

/// Benchmark appending a verdict to an in-memory ledger.
///
/// The database is created once outside the hot loop so the measurement is
/// steady-state insertion through the mutex and transaction, not schema setup.
fn bench_ledger_append(c: &mut Criterion) {
    let ledger = VerificationLedger::open_in_memory().expect("open in-memory ledger");
    let reasons = vec![
        "QR found: CERT-2026-0042".to_string(),
        "Signature present.".to_string(),
        "Logo detected.".to_string(),
    ];

    c.bench_function("ledger_append (in-memory SQLite)", |b| {
        b.iter(|| {
            ledger
                .append(
                    black_box("certificate.png"),
                    black_box(Some(
                        "abcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890",
                    )),
                    VerificationStatus::Verified,
                    black_box(&reasons),
                )
                .expect("append failed");
        });
    });
}

criterion_group!(benches, bench_content_hash, bench_ledger_append);
criterion_main!(benches);
