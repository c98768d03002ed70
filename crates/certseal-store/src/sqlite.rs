// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SQLite-backed object store: a single-file stand-in for a cloud bucket.

use std::path::Path;
use std::sync::Mutex;

use certseal_core::error::{CertsealError, Result};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, instrument};

use crate::object_store::{ObjectStore, validate_object_name};

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS objects (
        name       TEXT PRIMARY KEY,
        body       BLOB NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
"#;

fn db_err(e: rusqlite::Error) -> CertsealError {
    CertsealError::Database(e.to_string())
}

/// Objects stored as blobs in one SQLite table.
///
/// `rusqlite::Connection` is `Send` but not `Sync`, hence the mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the object database at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| CertsealError::Database(format!("open: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| CertsealError::Database(format!("WAL pragma: {e}")))?;
        Self::with_connection(conn)
    }

    /// In-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory().map_err(db_err)?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| CertsealError::Database(format!("create table: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CertsealError::Storage("sqlite store lock poisoned".into()))
    }
}

impl ObjectStore for SqliteStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        validate_object_name(name)?;
        self.lock()?
            .execute(
                "INSERT INTO objects (name, body) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET
                     body = excluded.body,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![name, bytes],
            )
            .map_err(db_err)?;
        debug!(name, len = bytes.len(), "object upserted");
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        validate_object_name(name)?;
        self.lock()?
            .query_row(
                "SELECT body FROM objects WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)
    }
}
