// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

use certseal_core::error::Result;

/// Return the application data directory, creating it if needed.
///
/// An explicit override (flag or `CERTSEAL_DATA_DIR`) wins; otherwise the
/// XDG data home is used.
pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs_fallback().join("certseal"),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Resolve a configured path against the data directory.
pub fn resolve(data_dir: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        data_dir.join(configured)
    }
}

fn dirs_fallback() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    PathBuf::from("/tmp")
}
