// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Password derivation: `DD-MM-YYYY` becomes `YYYYmonDD`.
//
// Lenient on purpose: only the month is checked.  Years and days of any
// length pass through unchanged, so `99-01-12345` yields `12345jan99`.
// Shape and calendar checks live at the verification boundary instead.

use certseal_core::error::{CertsealError, Result};
use certseal_core::{DateOfBirth, DerivedPassword};

const MONTHS: [(&str, &str); 12] = [
    ("01", "jan"),
    ("02", "feb"),
    ("03", "mar"),
    ("04", "apr"),
    ("05", "may"),
    ("06", "jun"),
    ("07", "jul"),
    ("08", "aug"),
    ("09", "sep"),
    ("10", "oct"),
    ("11", "nov"),
    ("12", "dec"),
];

/// Derive the key-lookup password for a date of birth.
///
/// Fails with [`CertsealError::MalformedDate`] when the value does not split
/// into exactly three `-`-separated parts, or when the (zero-padded) month is
/// not one of `01`..`12`.
pub fn derive_password(dob: &DateOfBirth) -> Result<DerivedPassword> {
    let parts: Vec<&str> = dob.as_str().split('-').collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(CertsealError::MalformedDate(format!(
            "expected DD-MM-YYYY, found {} part(s)",
            parts.len()
        )));
    };

    let day = zero_pad(day);
    let month = zero_pad(month);

    let abbrev = MONTHS
        .iter()
        .find(|(code, _)| *code == month)
        .map(|(_, abbrev)| *abbrev)
        .ok_or_else(|| CertsealError::MalformedDate(format!("unknown month code {month:?}")))?;

    Ok(DerivedPassword::new(format!("{year}{abbrev}{day}")))
}

/// Left-pad with zeros to two characters; longer values are left alone.
fn zero_pad(part: &str) -> String {
    format!("{part:0>2}")
}
