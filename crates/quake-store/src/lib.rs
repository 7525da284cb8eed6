//! SQLite persistence for merged earthquake records.
//!
//! # Features
//!
//! - **Idempotent DDL**: table, `UNIQUE` dedup key and indexes from the canonical schema
//! - **Append-only insert**: one transaction, `INSERT OR IGNORE`, existing keys counted
//! - **Export**: whole table or named `SELECT` queries to CSV
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use quake_store::{DEFAULT_TABLE, EarthquakeStore};
//!
//! let mut store = EarthquakeStore::open(Path::new("earthquakes.db"))?;
//! store.ensure_table(DEFAULT_TABLE)?;
//! let summary = store.insert_records(DEFAULT_TABLE, &records)?;
//! store.export_table(DEFAULT_TABLE, Path::new("outputs/earthquakes_export.csv"))?;
//! ```

#![deny(unsafe_code)]

mod error;
mod export;
mod queries;
mod schema;
mod store;

// === Error Types ===
pub use error::{Result, StoreError};

// === Store ===
pub use schema::{DEFAULT_TABLE, create_table_sql, validate_table_name};
pub use store::{EarthquakeStore, InsertSummary};

// === Named Queries ===
pub use queries::{
    NamedQuery, QueryOutcome, is_select, parse_named_queries, read_named_queries,
    run_named_queries,
};
