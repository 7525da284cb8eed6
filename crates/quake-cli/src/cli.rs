//! CLI argument definitions for the earthquake catalog loader.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use quake_fetch::{DEFAULT_END, DEFAULT_OUTPUT, DEFAULT_START};
use quake_store::DEFAULT_TABLE;

#[derive(Parser)]
#[command(
    name = "quake",
    version,
    about = "Japan earthquake catalog loader - normalize, merge and store multi-source CSV exports",
    long_about = "Normalize earthquake catalog exports from USGS, EMSC and GEOFON into one\n\
                  canonical schema, merge them without duplicates and load them into SQLite.\n\n\
                  Exports the stored table and named SELECT queries as CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize, merge and load catalog CSV files into the database.
    Load(LoadArgs),

    /// Export a stored table to CSV.
    Export(ExportArgs),

    /// Run named SELECT queries and write each result to CSV.
    Query(QueryArgs),

    /// Print aggregate summaries of a stored table.
    Stats(StatsArgs),

    /// Download the USGS catalog for the Japan bounding box.
    Fetch(FetchArgs),
}

#[derive(Parser)]
pub struct LoadArgs {
    /// CSV files or directories to load (default: scan --dir).
    #[arg(value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,

    /// Directory scanned when no inputs are given.
    #[arg(long = "dir", value_name = "DIR", default_value = "src/df")]
    pub dir: PathBuf,

    /// File-name pattern for directory scans.
    #[arg(long = "pattern", default_value = quake_ingest::DEFAULT_PATTERN)]
    pub pattern: String,

    /// Descend into subdirectories.
    #[arg(long = "recursive")]
    pub recursive: bool,

    #[command(flatten)]
    pub target: TableArgs,

    /// JSON object of extra header renames (`{"raw name": "canonical"}`).
    #[arg(long = "column-map", value_name = "FILE")]
    pub column_map: Option<PathBuf>,

    /// Compute dist_to_Tokyo from coordinates where the source has none.
    #[arg(long = "derive-distance")]
    pub derive_distance: bool,

    /// Export path for the full table after loading.
    #[arg(
        long = "export-path",
        value_name = "PATH",
        default_value = "outputs/earthquakes_export.csv"
    )]
    pub export_path: PathBuf,

    /// Skip the table export.
    #[arg(long = "no-export")]
    pub no_export: bool,

    /// Run the named queries after loading.
    #[arg(long = "run-queries")]
    pub run_queries: bool,

    /// SQL file with `-- name:` blocks.
    #[arg(long = "queries", value_name = "FILE", default_value = "src/queries.sql")]
    pub queries: PathBuf,

    /// Output directory for named query results.
    #[arg(long = "queries-out", value_name = "DIR", default_value = "outputs/queries")]
    pub queries_out: PathBuf,

    /// Normalize and merge only; nothing is written.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Database file and table shared by the store-backed commands.
#[derive(Parser)]
pub struct TableArgs {
    /// SQLite database file.
    #[arg(long = "db", value_name = "PATH", default_value = "earthquakes.db")]
    pub db: PathBuf,

    /// Target table name.
    #[arg(long = "table", default_value = DEFAULT_TABLE)]
    pub table: String,
}

#[derive(Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub target: TableArgs,

    /// Output CSV path.
    #[arg(
        long = "output",
        value_name = "PATH",
        default_value = "outputs/earthquakes_export.csv"
    )]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct QueryArgs {
    /// SQLite database file.
    #[arg(long = "db", value_name = "PATH", default_value = "earthquakes.db")]
    pub db: PathBuf,

    /// SQL file with `-- name:` blocks.
    #[arg(long = "queries", value_name = "FILE", default_value = "src/queries.sql")]
    pub queries: PathBuf,

    /// Output directory for query results.
    #[arg(long = "out", value_name = "DIR", default_value = "outputs/queries")]
    pub out: PathBuf,
}

#[derive(Parser)]
pub struct StatsArgs {
    #[command(flatten)]
    pub target: TableArgs,
}

#[derive(Parser)]
pub struct FetchArgs {
    /// First day of the window (YYYY-MM-DD).
    #[arg(long = "start", default_value_t = DEFAULT_START)]
    pub start: NaiveDate,

    /// Last day of the window (YYYY-MM-DD).
    #[arg(long = "end", default_value_t = DEFAULT_END)]
    pub end: NaiveDate,

    /// Output CSV path.
    #[arg(long = "output", value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn load_defaults() {
        let cli = Cli::try_parse_from(["quake", "load"]).unwrap();
        let Command::Load(args) = cli.command else {
            panic!("expected load");
        };
        assert!(args.inputs.is_empty());
        assert_eq!(args.dir, PathBuf::from("src/df"));
        assert_eq!(args.pattern, "*.csv");
        assert_eq!(args.target.db, PathBuf::from("earthquakes.db"));
        assert_eq!(args.target.table, "earthquakes");
        assert!(!args.derive_distance && !args.run_queries && !args.dry_run);
    }

    #[test]
    fn fetch_parses_dates() {
        let cli =
            Cli::try_parse_from(["quake", "fetch", "--start", "2025-01-01", "--end", "2025-01-31"])
                .unwrap();
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(args.output, PathBuf::from("JAPAN_USGS.csv"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["quake", "stats", "--log-format", "json", "-v"]).unwrap();
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert!(cli.verbosity.is_present());
    }
}
