//! Earthquake catalog ingestion utilities.
//!
//! This crate discovers catalog exports on disk and reads them into
//! [`quake_model::RawTable`]s for normalization.
//!
//! # Features
//!
//! - **CSV Loading**: first non-blank row is the header, BOMs and blank lines dropped
//! - **Input Discovery**: explicit files, directories, file-name patterns, recursion
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use quake_ingest::{discover_inputs, read_raw_table};
//!
//! let files = discover_inputs(&[], Path::new("src/df"), "*.csv", false)?;
//! for file in &files {
//!     let table = read_raw_table(file)?;
//! }
//! ```

#![deny(unsafe_code)]

mod csv_table;
mod discovery;
mod error;

// === Error Types ===
pub use error::{CsvReadError, IngestError, Result};

// === CSV Reading ===
pub use csv_table::{read_raw_table, read_raw_table_from_reader};

// === File Discovery ===
pub use discovery::{DEFAULT_PATTERN, compile_pattern, discover_inputs};
