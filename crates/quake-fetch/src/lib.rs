//! Download of raw earthquake catalogs.
//!
//! Only the USGS FDSN event service is fetched directly; EMSC and GEOFON
//! exports arrive as CSV files produced elsewhere.

#![deny(unsafe_code)]

mod error;
mod usgs;

pub use error::{FetchError, Result};
pub use usgs::{
    DEFAULT_END, DEFAULT_OUTPUT, DEFAULT_START, FDSN_EVENT_URL, FetchReport, UsgsClient,
    UsgsQuery, count_event_rows,
};
