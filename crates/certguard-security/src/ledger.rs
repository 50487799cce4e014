// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verification ledger — append-only SQLite record of every verdict.
//
// Schema:
//   documents(
//     id           INTEGER PRIMARY KEY AUTOINCREMENT,
//     filename     TEXT    NOT NULL,
//     doc_hash     TEXT    NOT NULL,   -- SHA-256 hex digest, '' for errors
//     status       TEXT    NOT NULL,   -- Verified | Flagged | Rejected | Error
//     reasons      TEXT    NOT NULL,   -- JSON array of reason strings
//     processed_at TEXT    NOT NULL    -- RFC 3339, UTC
//   )

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use certguard_core::error::CertguardError;
use certguard_core::types::{LedgerEntry, VerificationStatus};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, instrument};

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS documents (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        filename     TEXT    NOT NULL,
        doc_hash     TEXT    NOT NULL,
        status       TEXT    NOT NULL,
        reasons      TEXT    NOT NULL,
        processed_at TEXT    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS documents_doc_hash ON documents (doc_hash);
";

const SELECT_COLUMNS: &str = "SELECT id, filename, doc_hash, status, reasons, processed_at FROM documents";

// ---------------------------------------------------------------------------
// Local error helpers
// ---------------------------------------------------------------------------

/// Convert a `rusqlite::Error` into a `CertguardError::Storage`.
fn db_err(e: rusqlite::Error) -> CertguardError {
    CertguardError::Storage(e.to_string())
}

/// Column-level decode failure, reported through rusqlite's own error type so
/// it can be raised from inside a row mapper.
fn column_err(
    index: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    let status: String = row.get(3)?;
    let reasons: String = row.get(4)?;
    let processed_at: String = row.get(5)?;

    Ok(LedgerEntry {
        id: row.get(0)?,
        filename: row.get(1)?,
        doc_hash: row.get(2)?,
        status: status
            .parse::<VerificationStatus>()
            .map_err(|e| column_err(3, std::io::Error::other(e)))?,
        reasons: serde_json::from_str(&reasons).map_err(|e| column_err(4, e))?,
        processed_at: DateTime::parse_from_rfc3339(&processed_at)
            .map_err(|e| column_err(5, e))?
            .with_timezone(&Utc),
    })
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Append-only verification ledger backed by a single long-lived SQLite
/// connection.
///
/// The connection sits behind a mutex: appends are serialized, so identifier
/// assignment is atomic even when many requests finish at once. The ledger
/// is `Send + Sync` and is meant to be shared through an `Arc`.
pub struct VerificationLedger {
    conn: Mutex<Connection>,
}

impl VerificationLedger {
    /// Open (or create) the ledger database at `path`.
    ///
    /// The `documents` table is created automatically if it does not already
    /// exist. WAL mode is enabled so readers do not block the writer.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CertguardError> {
        let conn = Connection::open(path).map_err(db_err)?;

        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("verification ledger opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory ledger (useful for tests).
    pub fn open_in_memory() -> Result<Self, CertguardError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("in-memory verification ledger opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CertguardError> {
        self.conn
            .lock()
            .map_err(|_| CertguardError::Storage("ledger lock poisoned".into()))
    }

    /// Record a verdict and return the stored entry.
    ///
    /// The identifier comes from SQLite and the timestamp is captured here,
    /// truncated to milliseconds so the returned entry equals what a later
    /// read yields.
    #[instrument(skip_all, fields(%filename, %status))]
    pub fn append(
        &self,
        filename: &str,
        doc_hash: Option<&str>,
        status: VerificationStatus,
        reasons: &[String],
    ) -> Result<LedgerEntry, CertguardError> {
        let processed_at = Utc::now().trunc_subsecs(3);
        let reasons_json = serde_json::to_string(reasons)?;
        let doc_hash = doc_hash.unwrap_or_default();

        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;
        tx.execute(
            "INSERT INTO documents (filename, doc_hash, status, reasons, processed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                filename,
                doc_hash,
                status.as_str(),
                reasons_json,
                processed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ],
        )
        .map_err(db_err)?;
        let id = tx.last_insert_rowid();
        tx.commit().map_err(db_err)?;

        debug!(id, "ledger entry recorded");
        Ok(LedgerEntry {
            id,
            filename: filename.to_owned(),
            doc_hash: doc_hash.to_owned(),
            status,
            reasons: reasons.to_vec(),
            processed_at,
        })
    }

    /// Retrieve the most recent `limit` entries, ordered newest-first.
    pub fn recent(&self, limit: u32) -> Result<Vec<LedgerEntry>, CertguardError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?1"))
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![limit], entry_from_row)
            .map_err(db_err)?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    /// Retrieve every verdict recorded for a document hash, oldest first.
    pub fn entries_for_hash(&self, doc_hash: &str) -> Result<Vec<LedgerEntry>, CertguardError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE doc_hash = ?1 ORDER BY id ASC"))
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![doc_hash], entry_from_row)
            .map_err(db_err)?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    /// Return the total number of entries in the ledger.
    pub fn count(&self) -> Result<u64, CertguardError> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(db_err)
    }
}
