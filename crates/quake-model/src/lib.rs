//! Canonical data model for the Japan earthquake catalog loader.
//!
//! - [`CanonicalColumn`]: the fixed, ordered target schema
//! - [`SourceTag`]: provenance of a record
//! - [`RawTable`]: extractor output before normalization
//! - [`CanonicalTable`] / [`CanonicalRow`]: normalized rows, required fields still nullable
//! - [`EarthquakeRecord`]: validated row with non-null key fields
//! - [`BatchSummary`] / [`MergeSummary`]: exact row accounting

#![deny(unsafe_code)]

pub mod error;
pub mod record;
pub mod schema;
pub mod source;
pub mod summary;
pub mod table;

pub use error::{ModelError, Result};
pub use record::{DedupKey, EarthquakeRecord, TIME_FORMAT};
pub use schema::{CanonicalColumn, FieldKind, canonical_names};
pub use source::SourceTag;
pub use summary::{
    BatchSummary, FieldIssue, IssueKind, MAX_ISSUE_EXAMPLES, MergeSummary, TimeParseStage,
};
pub use table::{CanonicalRow, CanonicalTable, RawTable, is_null_cell};
