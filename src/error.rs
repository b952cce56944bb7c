//! Typed errors for the circulation core. Callers (the CLI today, any other
//! front end tomorrow) match on the variant to decide whether the user can
//! recover by fixing their input or whether the storage engine failed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// Missing or malformed input on a request. The user corrects the form
    /// and retries; nothing was written.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A referenced book or loan does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The book already has an active loan. No state change happened.
    #[error("{0}")]
    Conflict(String),

    /// Underlying SQLite failure. The transaction that hit it was rolled
    /// back, so no partial writes remain.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

impl From<rusqlite::Error> for LibraryError {
    fn from(e: rusqlite::Error) -> Self {
        LibraryError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(e: serde_json::Error) -> Self {
        LibraryError::Storage(format!("seed data is not valid JSON: {e}"))
    }
}
