use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info_span;

use quake_cli::pipeline::{LoadOptions, QueryPaths, export_table, run_load, run_query_file};
use quake_cli::types::{ExportSummary, LoadResult, QueryRun};
use quake_fetch::{FetchReport, UsgsClient, UsgsQuery};
use quake_store::EarthquakeStore;
use quake_transform::{CatalogStats, summarize};

use crate::cli::{ExportArgs, FetchArgs, LoadArgs, QueryArgs, StatsArgs};

pub fn run_load_command(args: &LoadArgs) -> Result<LoadResult> {
    let options = LoadOptions {
        inputs: args.inputs.clone(),
        dir: args.dir.clone(),
        pattern: args.pattern.clone(),
        recursive: args.recursive,
        db: args.target.db.clone(),
        table: args.target.table.clone(),
        column_map: args.column_map.clone(),
        derive_distance: args.derive_distance,
        export_path: (!args.no_export).then(|| args.export_path.clone()),
        queries: args.run_queries.then(|| QueryPaths {
            file: args.queries.clone(),
            out_dir: args.queries_out.clone(),
        }),
        dry_run: args.dry_run,
    };
    run_load(&options)
}

pub fn run_export(args: &ExportArgs) -> Result<ExportSummary> {
    let span = info_span!("export", table = %args.target.table);
    let _guard = span.enter();
    let store = open_store(args.target.db.as_path())?;
    export_table(&store, &args.target.table, &args.output)
}

pub fn run_query(args: &QueryArgs) -> Result<QueryRun> {
    let span = info_span!("query", file = %args.queries.display());
    let _guard = span.enter();
    let store = open_store(args.db.as_path())?;
    run_query_file(&store, &args.queries, &args.out)
}

pub fn run_stats(args: &StatsArgs) -> Result<CatalogStats> {
    let span = info_span!("stats", table = %args.target.table);
    let _guard = span.enter();
    let store = open_store(args.target.db.as_path())?;
    let records = store
        .load_records(&args.target.table)
        .with_context(|| format!("load table {}", args.target.table))?;
    summarize(&records).context("summarize records")
}

pub fn run_fetch(args: &FetchArgs) -> Result<FetchReport> {
    let span = info_span!("fetch", start = %args.start, end = %args.end);
    let _guard = span.enter();
    let query = UsgsQuery::default().with_window(args.start, args.end);
    let client = UsgsClient::new().context("build HTTP client")?;
    client
        .save(&query, &args.output)
        .with_context(|| format!("fetch USGS catalog into {}", args.output.display()))
}

/// Opens an existing database; a missing file is an error rather than a new empty store.
fn open_store(path: &Path) -> Result<EarthquakeStore> {
    if !path.is_file() {
        bail!("database not found: {}", path.display());
    }
    EarthquakeStore::open(path).with_context(|| format!("open database {}", path.display()))
}
