//! Normalization and merge pipeline for multi-source earthquake catalogs.
//!
//! - [`Normalizer`]: one raw table plus a source hint into a canonical table
//! - [`merge_tables`]: concatenation, required-field filter and dedup
//! - [`stats`]: aggregate summaries over merged records
//!
//! # Example
//!
//! ```ignore
//! use quake_map::MappingProfile;
//! use quake_transform::{NormalizeOptions, Normalizer, merge_tables};
//!
//! let profile = MappingProfile::default();
//! let normalizer = Normalizer::new(&profile, NormalizeOptions::default());
//! let batch = normalizer.normalize(&raw, "JAPAN_USGS.csv");
//! let merged = merge_tables(&[batch.table]);
//! ```

#![deny(unsafe_code)]

pub mod datetime;
mod error;
pub mod fields;
pub mod geo;
mod merge;
mod normalize;
pub mod stats;

pub use error::{Result, TransformError};
pub use fields::FieldValue;
pub use geo::{TOKYO, dist_to_tokyo};
pub use merge::{MergeOutcome, merge_tables};
pub use normalize::{NormalizeOptions, NormalizedBatch, Normalizer};
pub use stats::{CatalogStats, ColumnStats, records_frame, summarize};
