// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// certseal-store: The two external collaborators of the certificate
// pipeline, behind traits:
//
//   - `ObjectStore`: named blobs (`{serial}.pdf`, `{password}_key`).
//   - `RecordLookup`: serial number -> date of birth.
//
// Each store is constructed once by the caller and handed to the service;
// nothing here is global.

pub mod directory;
pub mod memory;
pub mod object_store;
pub mod records;
pub mod sqlite;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use object_store::{ObjectStore, validate_object_name};
pub use records::{CsvRecords, MemoryRecords, RecordLookup};
pub use sqlite::SqliteStore;
