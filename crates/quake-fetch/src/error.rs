//! Error types for catalog downloads.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while downloading a catalog export.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request URL could not be built.
    #[error("invalid request URL: {0}")]
    Url(String),

    /// Query window is empty or reversed.
    #[error("invalid time window: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    /// Network request failed.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("catalog service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body is not valid CSV.
    #[error("failed to parse CSV response: {0}")]
    Csv(#[from] quake_ingest::CsvReadError),

    /// Failed to write the downloaded file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::Http {
            status: 400,
            message: "Bad Request".to_string(),
        };
        assert_eq!(err.to_string(), "catalog service returned HTTP 400: Bad Request");
    }
}
