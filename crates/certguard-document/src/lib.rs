// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// certguard-document — Document authenticity pipeline.
//
// Decodes an uploaded certificate image, runs the barcode, signature, and
// logo checks against it, and folds their outcomes into a single verdict.

pub mod checks;
pub mod image;
pub mod pipeline;
pub mod scan;

// Re-export the primary types so callers can use `certguard_document::Pipeline` etc.
pub use checks::{BarcodeCheck, DocumentCheck, LogoCheck, SignatureCheck};
pub use crate::image::decoder::DecodedImage;
pub use pipeline::{Pipeline, aggregate};
