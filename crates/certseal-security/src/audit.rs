// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Audit trail: append-only SQLite log of every issue and verification
// attempt.
//
// Schema:
//   audit_log(
//     id            INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp     TEXT    NOT NULL,   -- RFC 3339
//     action        TEXT    NOT NULL,   -- "process" or "verify"
//     serial_number TEXT    NOT NULL,
//     document_hash TEXT,               -- SHA-256 hex, when known
//     success       INTEGER NOT NULL,   -- 0 = failure, 1 = success
//     details       TEXT                -- internal cause, never shown to holders
//   )

use std::path::Path;

use certseal_core::error::CertsealError;
use chrono::Utc;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS audit_log (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp     TEXT    NOT NULL,
        action        TEXT    NOT NULL,
        serial_number TEXT    NOT NULL,
        document_hash TEXT,
        success       INTEGER NOT NULL,
        details       TEXT
    );
    CREATE INDEX IF NOT EXISTS audit_log_serial ON audit_log (serial_number);
";

fn db_err(e: rusqlite::Error) -> CertsealError {
    CertsealError::Database(e.to_string())
}

/// A single entry in the audit log, used for queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub action: String,
    pub serial_number: String,
    pub document_hash: Option<String>,
    pub success: bool,
    pub details: Option<String>,
}

impl AuditEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            action: row.get(2)?,
            serial_number: row.get(3)?,
            document_hash: row.get(4)?,
            success: row.get::<_, i32>(5)? != 0,
            details: row.get(6)?,
        })
    }
}

/// Append-only audit log backed by a SQLite database.
///
/// Failed verifications are recorded with their real cause in `details`,
/// which is the only place that distinction survives.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CertsealError> {
        let conn = Connection::open(path).map_err(db_err)?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("audit log opened");
        Ok(Self { conn })
    }

    /// Open an in-memory audit database (useful for tests).
    pub fn open_in_memory() -> Result<Self, CertsealError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("in-memory audit log opened");
        Ok(Self { conn })
    }

    /// Record a new audit entry.
    #[instrument(skip(self, document_hash, details), fields(%action, %serial_number, success))]
    pub fn record(
        &self,
        action: &str,
        serial_number: &str,
        document_hash: Option<&str>,
        success: bool,
        details: Option<&str>,
    ) -> Result<(), CertsealError> {
        let timestamp = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO audit_log (timestamp, action, serial_number, document_hash, success, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    timestamp,
                    action,
                    serial_number,
                    document_hash,
                    i32::from(success),
                    details
                ],
            )
            .map_err(db_err)?;

        debug!("audit entry recorded");
        Ok(())
    }

    /// All entries for one serial number, oldest first.
    pub fn entries_for_serial(&self, serial_number: &str) -> Result<Vec<AuditEntry>, CertsealError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, action, serial_number, document_hash, success, details
                 FROM audit_log
                 WHERE serial_number = ?1
                 ORDER BY id ASC",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![serial_number], AuditEntry::from_row)
            .map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    /// Retrieve the most recent `limit` entries, newest first.
    pub fn recent_entries(&self, limit: u32) -> Result<Vec<AuditEntry>, CertsealError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, action, serial_number, document_hash, success, details
                 FROM audit_log
                 ORDER BY id DESC
                 LIMIT ?1",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![limit], AuditEntry::from_row)
            .map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    /// Return the total number of entries in the audit log.
    pub fn count(&self) -> Result<u64, CertsealError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .map_err(db_err)
    }
}
