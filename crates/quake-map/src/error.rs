//! Error types for mapping operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or building mapping configuration.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Override file could not be read.
    #[error("failed to read column map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Override file is not a JSON object of strings.
    #[error("invalid column map JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Override targets a name outside the canonical schema.
    #[error("column '{column}' maps to unknown canonical column '{target}'")]
    UnknownTarget { column: String, target: String },
}

pub type Result<T> = std::result::Result<T, MappingError>;
