// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the CLI to the certguard backend crates.
//
// Verification runs on the blocking pool under a deadline; every verdict is
// then recorded in the ledger without the ledger ever hiding the verdict.

pub mod app_services;
pub mod data_dir;
