// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory object store.

use std::collections::HashMap;
use std::sync::Mutex;

use certseal_core::error::{CertsealError, Result};
use tracing::debug;

use crate::object_store::{ObjectStore, validate_object_name};

/// Object store held entirely in memory.  Used by tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> CertsealError {
    CertsealError::Storage("memory store lock poisoned".into())
}

impl ObjectStore for MemoryStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        validate_object_name(name)?;
        let mut objects = self.objects.lock().map_err(poisoned)?;
        objects.insert(name.to_owned(), bytes.to_vec());
        debug!(name, len = bytes.len(), "object stored in memory");
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        validate_object_name(name)?;
        let objects = self.objects.lock().map_err(poisoned)?;
        Ok(objects.get(name).cloned())
    }
}
