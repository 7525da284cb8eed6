//! Column mapping and provenance inference.
//!
//! A [`MappingProfile`] bundles the [`ColumnMap`] and [`SourceInferencer`]
//! into one immutable value handed to the normalizer.

#![deny(unsafe_code)]

mod columns;
mod error;
mod source;

pub use columns::ColumnMap;
pub use error::{MappingError, Result};
pub use source::SourceInferencer;

/// Read-only mapping configuration shared by every normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingProfile {
    pub columns: ColumnMap,
    pub sources: SourceInferencer,
}

impl Default for MappingProfile {
    fn default() -> Self {
        Self {
            columns: ColumnMap::builtin(),
            sources: SourceInferencer::default(),
        }
    }
}

impl MappingProfile {
    pub fn new(columns: ColumnMap, sources: SourceInferencer) -> Self {
        Self { columns, sources }
    }

    /// Built-in profile with column overrides layered on top.
    #[must_use]
    pub fn with_column_overrides(mut self, overrides: &ColumnMap) -> Self {
        self.columns = self.columns.merged_with(overrides);
        self
    }
}
