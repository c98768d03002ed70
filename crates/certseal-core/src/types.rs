// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Certseal certificate vault.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CertsealError, Result};

/// Suffix appended to a derived password to name its key object.
pub const KEY_OBJECT_SUFFIX: &str = "_key";

/// Extension appended to a serial number to name its ciphertext object.
pub const CIPHERTEXT_OBJECT_EXTENSION: &str = ".pdf";

/// Certificate serial number as printed on the certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Trim surrounding whitespace and reject empty serials.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CertsealError::InvalidSerial("serial number is empty".into()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the object holding this certificate's ciphertext.
    pub fn ciphertext_object_name(&self) -> String {
        format!("{}{CIPHERTEXT_OBJECT_EXTENSION}", self.0)
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A date of birth in its external `DD-MM-YYYY` form.
///
/// Holds the raw string exactly as given, whitespace included; parsing
/// happens in the password deriver, which is lenient.  [`DateOfBirth::has_canonical_shape`] and
/// [`DateOfBirth::calendar_date`] are the stricter checks applied at the
/// verification boundary.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOfBirth(String);

impl DateOfBirth {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the value is exactly two digits, dash, two digits, dash,
    /// four digits.
    pub fn has_canonical_shape(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                2 | 5 => *b == b'-',
                _ => b.is_ascii_digit(),
            })
    }

    /// Interpret the value as a real calendar date, if it is one.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%d-%m-%Y").ok()
    }
}

// Dates of birth are one of the two verification factors; keep them out of logs.
impl std::fmt::Debug for DateOfBirth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DateOfBirth([REDACTED])")
    }
}

/// Password derived from a date of birth, e.g. `1990jan05`.
///
/// Only ever used as the lookup name of the real encryption key.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedPassword(String);

impl DerivedPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the object holding the encryption key for this password.
    pub fn key_object_name(&self) -> String {
        format!("{}{KEY_OBJECT_SUFFIX}", self.0)
    }
}

impl std::fmt::Debug for DerivedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedPassword([REDACTED])")
    }
}

/// Outcome of processing a certificate, handed back to the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessReceipt {
    pub receipt_id: Uuid,
    pub serial_number: SerialNumber,
    /// Link a QR composer should encode onto the printed certificate.
    pub verification_url: String,
    /// SHA-256 of the plaintext certificate.
    pub document_hash: String,
    /// `None` when PDF inspection is disabled.
    pub page_count: Option<usize>,
    pub ciphertext_len: usize,
    pub issued_at: DateTime<Utc>,
}
