// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Low-level scan analysis — adaptive binarization for ink detection and
// normalized cross-correlation for template matching.

pub mod correlate;
pub mod threshold;

pub use correlate::{best_match, match_template_normalized};
pub use threshold::{adaptive_threshold_inv, count_foreground};
