// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding uploads into paired color and luminance planes.

pub mod decoder;

pub use decoder::{DecodedImage, luma_bt601};
