// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory-backed object store: one file per object.
//
// Writes go to a temporary file in the same directory and are renamed over
// the target, so a reader sees either the old object or the new one, never
// a half-written file.

use std::io::Write;
use std::path::{Path, PathBuf};

use certseal_core::error::Result;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::object_store::{ObjectStore, validate_object_name};

pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("directory object store opened");
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_object_name(name)?;
        Ok(self.root.join(name))
    }
}

impl ObjectStore for DirectoryStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let target = self.path_for(name)?;

        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|e| e.error)?;

        debug!(name, len = bytes.len(), "object written");
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name)?.is_file())
    }
}
