// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Authenticity checks. Each check reads the decoded image and reports an
// outcome with a reason; none of them decides the final status.

pub mod barcode;
pub mod logo;
pub mod signature;

pub use barcode::BarcodeCheck;
pub use logo::LogoCheck;
pub use signature::SignatureCheck;

use certguard_core::error::Result;
use certguard_core::types::{CheckKind, CheckOutcome};

use crate::image::DecodedImage;

/// A single, independent test of a decoded document.
///
/// `Ok(CheckOutcome::Failed(_))` means the evidence is absent. `Err` means
/// the check could not be evaluated at all, which turns the whole verdict
/// into an error.
pub trait DocumentCheck: Send + Sync {
    /// Which check this is; fixes where its reason appears in the verdict.
    fn kind(&self) -> CheckKind;

    fn run(&self, image: &DecodedImage) -> Result<CheckOutcome>;
}
