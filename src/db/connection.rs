//! Store lifecycle: opening the SQLite database, creating the schema, and
//! the destructive full reset. Everything else in `db` assumes the schema
//! these functions guarantee.

use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use rusqlite::{Connection, Error as SqlError, ErrorCode};
use tracing::{debug, info};

use crate::error::{LibraryError, Result};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-loan-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";

/// Open (creating if necessary) the on-disk store and ensure the schema
/// exists. Foreign keys are switched on so the connection behaves the same
/// during tests and production runs.
pub fn open_store() -> Result<Connection> {
    let db_path = db_path()?;

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| LibraryError::Storage(format!("failed to create data directory: {e}")))?;
    }

    let conn = Connection::open(&db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    ensure_schema(&conn)?;
    debug!(path = %db_path.display(), "opened library store");
    Ok(conn)
}

/// Open a throwaway in-memory store with the same schema. Used by tests and
/// by callers that want an ephemeral session.
pub fn open_in_memory_store() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create both collections exactly once. `books` is keyed by the accession
/// number (always text) with a secondary index on title for searches;
/// `loans` gets an auto-increment id and a secondary index on the accession
/// number so availability checks do not scan the whole table. Re-running on
/// an existing store is a no-op.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            accession_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            publisher TEXT NOT NULL,
            genre TEXT NOT NULL,
            accession_date TEXT NOT NULL,
            origin TEXT NOT NULL,
            status TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_books_title ON books(title)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS loans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            accession_id TEXT NOT NULL,
            title TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            borrower_type TEXT NOT NULL,
            borrower_name TEXT NOT NULL,
            grade TEXT,
            classroom TEXT,
            loan_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            returned INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_loans_accession ON loans(accession_id)",
        [],
    )?;

    Ok(())
}

/// Wipe every book and loan in one transaction, for a forced re-bootstrap.
/// If another live connection holds the store, SQLite reports busy/locked;
/// that surfaces as a storage error telling the user to close other sessions
/// instead of leaving the store half-cleared.
pub fn reset_all(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction().map_err(map_busy)?;
    tx.execute("DELETE FROM loans", []).map_err(map_busy)?;
    tx.execute("DELETE FROM books", []).map_err(map_busy)?;
    tx.commit().map_err(map_busy)?;
    info!("library store wiped");
    Ok(())
}

/// Coerce SQLite busy/locked errors into the "close other sessions" message
/// the reset flow promises callers.
fn map_busy(err: SqlError) -> LibraryError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    ) {
        LibraryError::Storage(
            "the store is in use by another session; close other sessions and retry".to_string(),
        )
    } else {
        err.into()
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| LibraryError::Storage("could not locate home directory".to_string()))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
