//! Catalog load pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Store**: Open the database and ensure the target table
//! 2. **Ingest**: Discover input files and read them into raw tables
//! 3. **Normalize**: Map, coerce and dedup each file on its own
//! 4. **Merge**: Concatenate batches, drop incomplete rows and duplicates
//! 5. **Insert**: Append the merged records, skipping stored keys, with
//!    counts kept per file
//! 6. **Output**: Named query CSVs and the full table export
//!
//! A file that cannot be read is reported and the remaining files still
//! load. Sink failures are collected so later outputs still run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, info_span, warn};

use quake_ingest::{discover_inputs, read_raw_table};
use quake_map::{ColumnMap, MappingProfile};
use quake_model::CanonicalTable;
use quake_store::{EarthquakeStore, InsertSummary, read_named_queries, run_named_queries};
use quake_transform::{NormalizeOptions, NormalizedBatch, Normalizer, merge_tables};

use crate::types::{ExportSummary, FileOutcome, FileSummary, LoadResult, QueryRun};

/// Everything `quake load` needs, resolved from CLI flags.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub inputs: Vec<PathBuf>,
    pub dir: PathBuf,
    pub pattern: String,
    pub recursive: bool,
    pub db: PathBuf,
    pub table: String,
    pub column_map: Option<PathBuf>,
    pub derive_distance: bool,
    /// `None` skips the export.
    pub export_path: Option<PathBuf>,
    /// `None` skips the named queries.
    pub queries: Option<QueryPaths>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct QueryPaths {
    pub file: PathBuf,
    pub out_dir: PathBuf,
}

/// Built-in mapping profile, with JSON overrides layered on when given.
pub fn load_profile(column_map: Option<&Path>) -> Result<MappingProfile> {
    let profile = MappingProfile::default();
    let Some(path) = column_map else {
        return Ok(profile);
    };
    let overrides = ColumnMap::load_json(path)
        .with_context(|| format!("load column map {}", path.display()))?;
    info!(path = %path.display(), entries = overrides.len(), "column overrides loaded");
    Ok(profile.with_column_overrides(&overrides))
}

// ============================================================================
// Stage 2-3: Ingest and normalize
// ============================================================================

/// Reads and normalizes one file. The file name is the provenance hint.
pub fn normalize_file(
    normalizer: &Normalizer<'_>,
    path: &Path,
) -> quake_ingest::Result<NormalizedBatch> {
    let raw = read_raw_table(path)?;
    let hint = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(normalizer.normalize(&raw, &hint))
}

/// Normalized tables plus, for each table, the index of its file summary.
struct NormalizedFiles {
    summaries: Vec<FileSummary>,
    tables: Vec<CanonicalTable>,
    table_files: Vec<usize>,
}

fn normalize_files(normalizer: &Normalizer<'_>, files: &[PathBuf]) -> NormalizedFiles {
    let mut summaries = Vec::with_capacity(files.len());
    let mut tables = Vec::with_capacity(files.len());
    let mut table_files = Vec::with_capacity(files.len());
    for (index, path) in files.iter().enumerate() {
        let source = normalizer.profile().sources.infer_from_path(path);
        let outcome = match normalize_file(normalizer, path) {
            Ok(batch) => {
                tables.push(batch.table);
                table_files.push(index);
                FileOutcome::Normalized(batch.summary)
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "file failed");
                FileOutcome::Failed(err.to_string())
            }
        };
        summaries.push(FileSummary {
            path: path.clone(),
            source,
            outcome,
            insert: None,
        });
    }
    NormalizedFiles {
        summaries,
        tables,
        table_files,
    }
}

// ============================================================================
// Stage 6: Output
// ============================================================================

/// Runs the named queries in `file`. A missing file is reported, not an error.
pub fn run_query_file(store: &EarthquakeStore, file: &Path, out_dir: &Path) -> Result<QueryRun> {
    let Some(queries) =
        read_named_queries(file).with_context(|| format!("read queries {}", file.display()))?
    else {
        warn!(path = %file.display(), "query file not found, skipping");
        return Ok(QueryRun::MissingFile(file.to_path_buf()));
    };
    if queries.is_empty() {
        warn!(path = %file.display(), "no named queries found");
    }
    let outcomes = run_named_queries(store, &queries, out_dir).context("run named queries")?;
    Ok(QueryRun::Ran(outcomes))
}

/// Writes the whole table to `path`.
pub fn export_table(store: &EarthquakeStore, table: &str, path: &Path) -> Result<ExportSummary> {
    let rows = store
        .export_table(table, path)
        .with_context(|| format!("export {table} to {}", path.display()))?;
    info!(table, rows, path = %path.display(), "table exported");
    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows,
    })
}

/// Runs the full load. Only store setup and discovery failures abort it;
/// everything later is recorded in the result.
pub fn run_load(options: &LoadOptions) -> Result<LoadResult> {
    let span = info_span!("load", db = %options.db.display(), table = %options.table);
    let _guard = span.enter();

    // =========================================================================
    // Stage 1: Store
    // =========================================================================
    let profile = load_profile(options.column_map.as_deref())?;
    let mut store = if options.dry_run {
        None
    } else {
        let store = EarthquakeStore::open(&options.db)
            .with_context(|| format!("open database {}", options.db.display()))?;
        store
            .ensure_table(&options.table)
            .with_context(|| format!("ensure table {}", options.table))?;
        Some(store)
    };

    // =========================================================================
    // Stage 2-3: Ingest and normalize
    // =========================================================================
    let files = discover_inputs(
        &options.inputs,
        &options.dir,
        &options.pattern,
        options.recursive,
    )
    .context("discover input files")?;
    if files.is_empty() {
        warn!(dir = %options.dir.display(), pattern = %options.pattern, "no input files found");
    } else {
        info!(files = files.len(), "inputs discovered");
    }
    let normalizer = Normalizer::new(
        &profile,
        NormalizeOptions {
            derive_missing_distance: options.derive_distance,
        },
    );
    let NormalizedFiles {
        summaries: file_summaries,
        tables,
        table_files,
    } = normalize_files(&normalizer, &files);

    // =========================================================================
    // Stage 4: Merge
    // =========================================================================
    let merged = merge_tables(&tables);

    let mut errors: Vec<String> = file_summaries
        .iter()
        .filter_map(|file| match &file.outcome {
            FileOutcome::Failed(message) => Some(message.clone()),
            FileOutcome::Normalized(_) => None,
        })
        .collect();
    let mut result = LoadResult {
        db: options.db.clone(),
        table: options.table.clone(),
        dry_run: options.dry_run,
        files: file_summaries,
        merge: merged.summary.clone(),
        insert: None,
        queries: None,
        export: None,
        errors: Vec::new(),
        has_errors: false,
    };

    let Some(store) = store.as_mut() else {
        info!(rows = merged.records.len(), "dry run, nothing written");
        result.has_errors = !errors.is_empty();
        result.errors = errors;
        return Ok(result);
    };

    // =========================================================================
    // Stage 5: Insert
    // =========================================================================
    match store.insert_batches(&options.table, &merged.batches()) {
        Ok(per_file) => {
            let mut total = InsertSummary::default();
            for (&file_index, summary) in table_files.iter().zip(per_file) {
                total += summary;
                if let Some(file) = result.files.get_mut(file_index) {
                    file.insert = Some(summary);
                }
            }
            result.insert = Some(total);
        }
        Err(err) => {
            error!(table = %options.table, error = %err, "insert failed");
            errors.push(format!("insert into {}: {err}", options.table));
        }
    }

    // =========================================================================
    // Stage 6: Output
    // =========================================================================
    if let Some(paths) = &options.queries {
        match run_query_file(store, &paths.file, &paths.out_dir) {
            Ok(run) => {
                if let QueryRun::Ran(outcomes) = &run {
                    errors.extend(
                        outcomes
                            .iter()
                            .filter(|outcome| outcome.is_failed())
                            .map(|outcome| format!("query {} failed", outcome.name())),
                    );
                }
                result.queries = Some(run);
            }
            Err(err) => {
                error!(error = %err, "named queries failed");
                errors.push(format!("{err:#}"));
            }
        }
    }
    if let Some(path) = &options.export_path {
        match export_table(store, &options.table, path) {
            Ok(summary) => result.export = Some(summary),
            Err(err) => {
                error!(error = %err, "export failed");
                errors.push(format!("{err:#}"));
            }
        }
    }

    result.has_errors = !errors.is_empty();
    result.errors = errors;
    Ok(result)
}
