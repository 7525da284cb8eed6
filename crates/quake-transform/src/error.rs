//! Error types for the transform crate.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors from frame-based aggregation. Normalization and merging never fail.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
