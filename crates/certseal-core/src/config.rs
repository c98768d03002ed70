// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which object store backend holds ciphertexts and keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// One file per object under `<data_dir>/objects`.
    Directory,
    /// A single SQLite database at `<data_dir>/objects.db`.
    Sqlite,
}

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Public base URL that verification links point at.
    pub verify_base_url: String,
    /// CSV file mapping `serial_number` to `dob`.  Relative paths resolve
    /// against the data directory.
    pub records_path: PathBuf,
    /// Where encrypted certificates and keys are kept.
    pub store_backend: StoreBackend,
    /// Reject uploads that do not parse as a PDF.
    pub require_pdf: bool,
    /// Reject dates of birth that are not real calendar dates at verification.
    pub strict_dates: bool,
    /// Enable audit trail logging.
    pub audit_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verify_base_url: "http://localhost:5000".into(),
            records_path: PathBuf::from("certificates.csv"),
            store_backend: StoreBackend::Directory,
            require_pdf: true,
            strict_dates: false,
            audit_enabled: true,
        }
    }
}

impl AppConfig {
    /// Verification link for a serial number, as encoded into the QR code.
    pub fn verification_url(&self, serial: &crate::SerialNumber) -> String {
        format!(
            "{}/verify?serial={}",
            self.verify_base_url.trim_end_matches('/'),
            serial
        )
    }
}
