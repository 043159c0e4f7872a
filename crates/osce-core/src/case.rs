//! SQLite-backed store of clinical case definitions.
//!
//! Cases are the only persistent data in OSCE Voice. Sessions live in memory;
//! the case table survives restarts and can back any number of sessions.

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// One clinical case a trainee can interview.
#[derive(Debug, Clone)]
pub struct Case {
    /// Stable identifier clients pass as `caseReference`.
    pub reference: String,
    pub title: String,
    /// Hidden patient background. Fed to the model, never to the trainee.
    pub description: String,
    /// Unix seconds when the case was first defined.
    pub created_at: i64,
}

/// Case database wrapper.
///
/// Thread-safe via internal Mutex. All database operations acquire the lock.
pub struct CaseDatabase {
    conn: Mutex<Connection>,
}

impl CaseDatabase {
    /// Open the case database at `path`, creating file and schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(Error::Database)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        debug!(path = %path.display(), "case database opened");
        Ok(db)
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::Database)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS clinical_case (
                reference   TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at  INTEGER NOT NULL DEFAULT (unixepoch())
            )",
        )?;
        Ok(())
    }

    /// Look up a case, failing with `CaseNotFound` for an unknown reference.
    pub fn resolve(&self, reference: &str) -> Result<Case> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT reference, title, description, created_at
             FROM clinical_case WHERE reference = ?1",
        )?;

        stmt.query_row(params![reference], Self::map_case)
            .optional()?
            .ok_or_else(|| Error::CaseNotFound(reference.to_string()))
    }

    /// Insert a case, replacing the title and description of an existing one.
    pub fn upsert(&self, reference: &str, title: &str, description: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute(
            "INSERT INTO clinical_case (reference, title, description)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(reference) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description",
            params![reference, title, description],
        )?;
        Ok(())
    }

    /// List every case ordered by reference.
    pub fn list(&self) -> Result<Vec<Case>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let mut stmt = conn.prepare(
            "SELECT reference, title, description, created_at
             FROM clinical_case ORDER BY reference",
        )?;

        let cases = stmt
            .query_map([], Self::map_case)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cases)
    }

    /// Number of cases currently defined.
    pub fn count(&self) -> Result<u32> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let n = conn.query_row("SELECT COUNT(*) FROM clinical_case", [], |row| row.get(0))?;
        Ok(n)
    }

    fn map_case(row: &rusqlite::Row<'_>) -> rusqlite::Result<Case> {
        Ok(Case {
            reference: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}
