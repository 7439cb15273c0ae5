//! Record store error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file or its directory could not be prepared
    #[error("failed to prepare database file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to ensure users schema: {0}")]
    Schema(#[source] rusqlite::Error),
    /// Unique-email constraint violation
    #[error("email already in use: {email}")]
    DuplicateEmail { email: String },
    #[error("user {0} not found")]
    NotFound(i64),
    #[error("record store is closed")]
    Closed,
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    /// Map a failed write, turning UNIQUE violations into `DuplicateEmail`.
    ///
    /// Other constraint failures (NOT NULL, CHECK, ...) stay `Database`.
    pub(super) fn from_write(err: rusqlite::Error, email: &str) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::DuplicateEmail {
                    email: email.to_string(),
                }
            }
            other => Self::Database(other),
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub const fn is_constraint(&self) -> bool {
        matches!(self, Self::DuplicateEmail { .. })
    }
}
