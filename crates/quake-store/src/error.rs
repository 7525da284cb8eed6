//! Error types for the persistence layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the store and the export utilities.
///
/// A failed insert leaves the caller's merged records untouched, so the same
/// batch can be retried.
#[derive(Debug, Error)]
pub enum StoreError {
    // === Database Errors ===
    /// Failed to open the database file.
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// SQL, constraint or driver failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Table name is not a plain identifier.
    #[error("invalid table name '{name}': expected letters, digits and underscores")]
    InvalidTableName { name: String },

    /// A stored row could not be read back as a record.
    #[error("corrupt row {row_id} in {table}: {message}")]
    CorruptRow {
        table: String,
        row_id: i64,
        message: String,
    },

    // === File Errors ===
    /// Failed to read or create a file or directory.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write CSV output.
    #[error("failed to write CSV {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
