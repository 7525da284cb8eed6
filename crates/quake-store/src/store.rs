//! Persistence Gateway backed by SQLite.

use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{Connection, params};
use tracing::{debug, info, info_span};

use quake_model::{CanonicalColumn, EarthquakeRecord, SourceTag, TIME_FORMAT};

use crate::error::{Result, StoreError};
use crate::export::write_query_csv;
use crate::schema::{column_list, create_table_sql, quoted, validate_table_name};

/// Outcome of one append-only insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub attempted: usize,
    pub inserted: usize,
    /// Rows whose dedup key was already stored.
    pub skipped_existing: usize,
}

impl AddAssign for InsertSummary {
    fn add_assign(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.inserted += other.inserted;
        self.skipped_existing += other.skipped_existing;
    }
}

/// A stored row before it is validated back into a record.
struct StoredRow {
    id: i64,
    source: String,
    time: String,
    month: Option<String>,
    category: Option<String>,
    latitude: f64,
    longitude: f64,
    depth: Option<f64>,
    magnitude: Option<f64>,
    region: Option<String>,
    dist_to_tokyo: Option<f64>,
}

impl StoredRow {
    fn into_record(self, table: &str) -> Result<EarthquakeRecord> {
        let corrupt = |message: String| StoreError::CorruptRow {
            table: table.to_string(),
            row_id: self.id,
            message,
        };
        let source = SourceTag::from_str(&self.source).map_err(|err| corrupt(err.to_string()))?;
        let time = NaiveDateTime::parse_from_str(&self.time, TIME_FORMAT)
            .map_err(|err| corrupt(format!("time '{}': {err}", self.time)))?;
        Ok(EarthquakeRecord {
            source,
            time,
            month: self.month,
            category: self.category,
            latitude: self.latitude,
            longitude: self.longitude,
            depth: self.depth,
            magnitude: self.magnitude,
            region: self.region,
            dist_to_tokyo: self.dist_to_tokyo,
        })
    }
}

/// One SQLite connection holding the earthquake table(s).
pub struct EarthquakeStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for EarthquakeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EarthquakeStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EarthquakeStore {
    /// Opens (or creates) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "database opened");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: None,
        })
    }

    /// Database file, `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Underlying connection, for ad-hoc reads.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the table and its indexes if they do not exist yet.
    pub fn ensure_table(&self, table: &str) -> Result<()> {
        let sql = create_table_sql(table)?;
        self.conn.execute_batch(&sql)?;
        info!(table, "table ensured");
        Ok(())
    }

    /// Appends records in one transaction. Rows whose dedup key is already
    /// stored are skipped and counted, never duplicated.
    pub fn insert_records(
        &mut self,
        table: &str,
        records: &[EarthquakeRecord],
    ) -> Result<InsertSummary> {
        let per_batch = self.insert_batches(table, &[records])?;
        Ok(per_batch.into_iter().fold(InsertSummary::default(), |mut total, batch| {
            total += batch;
            total
        }))
    }

    /// Appends several batches in one transaction and counts each batch on
    /// its own. Nothing is stored if any row fails.
    pub fn insert_batches(
        &mut self,
        table: &str,
        batches: &[&[EarthquakeRecord]],
    ) -> Result<Vec<InsertSummary>> {
        let table = validate_table_name(table)?;
        let attempted: usize = batches.iter().map(|batch| batch.len()).sum();
        let span = info_span!("insert", table, batches = batches.len(), records = attempted);
        let _guard = span.enter();

        let placeholders = vec!["?"; CanonicalColumn::ALL.len()].join(", ");
        let sql = format!(
            "INSERT OR IGNORE INTO {} ({}) VALUES ({placeholders})",
            quoted(table),
            column_list()
        );

        let mut summaries = Vec::with_capacity(batches.len());
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            for (index, batch) in batches.iter().enumerate() {
                let mut inserted = 0usize;
                for record in *batch {
                    inserted += stmt.execute(params![
                        record.source.as_str(),
                        record.time.format(TIME_FORMAT).to_string(),
                        record.month.as_deref(),
                        record.category.as_deref(),
                        record.latitude,
                        record.longitude,
                        record.depth,
                        record.magnitude,
                        record.region.as_deref(),
                        record.dist_to_tokyo,
                    ])?;
                }
                let summary = InsertSummary {
                    attempted: batch.len(),
                    inserted,
                    skipped_existing: batch.len() - inserted,
                };
                debug!(
                    batch = index,
                    attempted = summary.attempted,
                    inserted = summary.inserted,
                    "batch written"
                );
                summaries.push(summary);
            }
        }
        tx.commit()?;

        let inserted: usize = summaries.iter().map(|summary| summary.inserted).sum();
        info!(
            attempted,
            inserted,
            skipped_existing = attempted - inserted,
            "insert complete"
        );
        Ok(summaries)
    }

    /// Number of stored rows.
    pub fn count(&self, table: &str) -> Result<usize> {
        let table = validate_table_name(table)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quoted(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Reads the table back as records, in insertion order.
    pub fn load_records(&self, table: &str) -> Result<Vec<EarthquakeRecord>> {
        let table = validate_table_name(table)?;
        let sql = format!(
            "SELECT \"id\", {} FROM {} ORDER BY \"id\"",
            column_list(),
            quoted(table)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredRow {
                id: row.get(0)?,
                source: row.get(1)?,
                time: row.get(2)?,
                month: row.get(3)?,
                category: row.get(4)?,
                latitude: row.get(5)?,
                longitude: row.get(6)?,
                depth: row.get(7)?,
                magnitude: row.get(8)?,
                region: row.get(9)?,
                dist_to_tokyo: row.get(10)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record(table)?);
        }
        Ok(records)
    }

    /// Writes the whole table to CSV. Returns the row count.
    pub fn export_table(&self, table: &str, path: &Path) -> Result<usize> {
        let table = validate_table_name(table)?;
        let rows = write_query_csv(
            &self.conn,
            &format!("SELECT * FROM {}", quoted(table)),
            path,
        )?;
        info!(table, rows, path = %path.display(), "table exported");
        Ok(rows)
    }
}
