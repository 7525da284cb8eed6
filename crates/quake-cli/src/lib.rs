//! CLI library components for the earthquake catalog loader.

pub mod logging;
pub mod pipeline;
pub mod summary;
pub mod types;
