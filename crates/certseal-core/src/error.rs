// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Certseal.

use thiserror::Error;

/// Top-level error type for all Certseal operations.
#[derive(Debug, Error)]
pub enum CertsealError {
    // -- Credential errors --
    #[error("malformed date of birth: {0}")]
    MalformedDate(String),

    #[error("invalid serial number: {0}")]
    InvalidSerial(String),

    #[error("no certificate record for serial number {0}")]
    MissingRecord(String),

    // -- Cryptographic errors --
    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    /// The single outward-facing verification failure.  Wrong serial, wrong
    /// date of birth and corrupted stored data all collapse into this.
    #[error("certificate verification failed")]
    VerificationFailed,

    // -- Document errors --
    #[error("invalid certificate document: {0}")]
    InvalidDocument(String),

    // -- Storage / persistence --
    #[error("invalid object name: {0:?}")]
    InvalidObjectName(String),

    #[error("object store error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CertsealError>;
