//! Named SQL queries exported to per-query CSV files.
//!
//! A query file holds blocks introduced by a marker line:
//!
//! ```sql
//! -- name: strongest_per_source
//! SELECT source, MAX(magnitude) FROM earthquakes GROUP BY source;
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::export::write_query_csv;
use crate::store::EarthquakeStore;

/// One `-- name:` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: String,
    pub sql: String,
}

/// What happened to one named query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Written {
        name: String,
        path: PathBuf,
        rows: usize,
    },
    /// Not a `SELECT`; never executed.
    Skipped { name: String },
    Failed { name: String, message: String },
}

impl QueryOutcome {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Written { name, .. } | Self::Skipped { name } | Self::Failed { name, .. } => name,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Returns the query name when `line` is a `-- name: <name>` marker.
fn marker_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("--")?.trim_start();
    rest.strip_prefix("name:").map(str::trim)
}

/// Splits query text into named blocks. Text before the first marker is
/// ignored, one trailing `;` is trimmed, and blocks with an empty name or
/// empty SQL are dropped.
pub fn parse_named_queries(text: &str) -> Vec<NamedQuery> {
    let mut blocks: Vec<(String, Vec<&str>)> = Vec::new();
    for line in text.lines() {
        if let Some(name) = marker_name(line) {
            blocks.push((name.to_string(), Vec::new()));
        } else if let Some((_, body)) = blocks.last_mut() {
            body.push(line);
        }
    }
    blocks
        .into_iter()
        .filter_map(|(name, body)| {
            let joined = body.join("\n");
            let sql = joined.trim();
            let sql = sql.strip_suffix(';').map_or(sql, str::trim_end);
            (!name.is_empty() && !sql.is_empty()).then(|| NamedQuery {
                name,
                sql: sql.to_string(),
            })
        })
        .collect()
}

/// Reads a query file. `None` when the file does not exist.
pub fn read_named_queries(path: &Path) -> Result<Option<Vec<NamedQuery>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(parse_named_queries(&text)))
}

/// Case-insensitive `SELECT` prefix check.
#[must_use]
pub fn is_select(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}

/// File name for a query's CSV, with path separators replaced.
fn output_file(out_dir: &Path, name: &str) -> PathBuf {
    let safe: String = name
        .chars()
        .map(|ch| if matches!(ch, '/' | '\\' | ':') { '_' } else { ch })
        .collect();
    out_dir.join(format!("{safe}.csv"))
}

/// Runs each `SELECT` and writes `<out_dir>/<name>.csv`. A failing query is
/// reported and the rest still run.
pub fn run_named_queries(
    store: &EarthquakeStore,
    queries: &[NamedQuery],
    out_dir: &Path,
) -> Result<Vec<QueryOutcome>> {
    fs::create_dir_all(out_dir).map_err(|source| StoreError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let total = queries.len();
    let mut outcomes = Vec::with_capacity(total);
    for (index, query) in queries.iter().enumerate() {
        let position = index + 1;
        if !is_select(&query.sql) {
            warn!(name = %query.name, position, total, "skipped non-SELECT query");
            outcomes.push(QueryOutcome::Skipped {
                name: query.name.clone(),
            });
            continue;
        }
        let path = output_file(out_dir, &query.name);
        match write_query_csv(store.connection(), &query.sql, &path) {
            Ok(rows) => {
                info!(name = %query.name, position, total, rows, path = %path.display(), "query written");
                outcomes.push(QueryOutcome::Written {
                    name: query.name.clone(),
                    path,
                    rows,
                });
            }
            Err(error) => {
                warn!(name = %query.name, position, total, %error, "query failed");
                outcomes.push(QueryOutcome::Failed {
                    name: query.name.clone(),
                    message: error.to_string(),
                });
            }
        }
    }
    Ok(outcomes)
}
