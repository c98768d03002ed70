// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Object store abstraction.

use certseal_core::error::{CertsealError, Result};

/// A flat namespace of byte blobs.
///
/// `put` replaces any existing object of the same name; there is no
/// versioning.  `get` returns `Ok(None)` for a missing object so callers can
/// tell "absent" from "store failed".
pub trait ObjectStore: Send + Sync {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<()>;

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>>;

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.is_some())
    }
}

/// Reject names that could escape a directory or confuse a backend.
///
/// Object names come from serial numbers and dates of birth typed by
/// people, so `../../etc/passwd.pdf` must never reach the filesystem.
pub fn validate_object_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if bad {
        return Err(CertsealError::InvalidObjectName(name.to_owned()));
    }
    Ok(())
}
