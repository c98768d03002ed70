// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for certificate holders and issuing staff.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Verification failures deliberately get one message regardless of cause.

use crate::error::CertsealError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk or database hiccup; trying again may work.
    Transient,
    /// The user must correct their input.
    ActionRequired,
    /// Retrying will not help (bad document, corrupt configuration).
    Permanent,
}

impl Severity {
    /// Process exit code used by the command-line front end.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Transient => 75,
            Self::ActionRequired => 65,
            Self::Permanent => 70,
        }
    }
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether trying the same thing again might succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `CertsealError` into a `HumanError`.
pub fn humanize_error(err: &CertsealError) -> HumanError {
    match err {
        CertsealError::MalformedDate(_) => HumanError {
            message: "That date of birth doesn't look right.".into(),
            suggestion: "Enter the date as DD-MM-YYYY, for example 05-01-1990.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CertsealError::InvalidSerial(_) => HumanError {
            message: "That serial number is missing.".into(),
            suggestion: "Enter the serial number printed on the certificate.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CertsealError::MissingRecord(serial) => HumanError {
            message: "We have no record of that certificate.".into(),
            suggestion: format!(
                "Check the serial number ({serial}) against the records file, then try again."
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // Never say which factor was wrong.
        CertsealError::VerificationFailed
        | CertsealError::Decryption(_)
        | CertsealError::IntegrityMismatch { .. } => HumanError {
            message: "Certificate verification failed.".into(),
            suggestion: "Please check your serial number and date of birth, then try again."
                .into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CertsealError::Encryption(_) => HumanError {
            message: "The certificate couldn't be sealed.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CertsealError::InvalidDocument(_) => HumanError {
            message: "That file isn't a usable PDF certificate.".into(),
            suggestion: "Export the certificate as a PDF and upload that file.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        CertsealError::InvalidObjectName(_) => HumanError {
            message: "That serial number can't be stored.".into(),
            suggestion: "Serial numbers must not contain slashes or be \".\" or \"..\".".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CertsealError::Storage(_) | CertsealError::Database(_) => HumanError {
            message: "The certificate store had a problem.".into(),
            suggestion: "Try again in a moment.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CertsealError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "A file couldn't be found.".into(),
                    suggestion: "Check the file path and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        CertsealError::Serialization(_) | CertsealError::Config(_) => HumanError {
            message: "The configuration couldn't be read.".into(),
            suggestion: "Check config.json and the records file for mistakes.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
