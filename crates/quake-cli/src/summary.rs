//! Human-readable run summaries rendered with `comfy-table`.

use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use quake_fetch::FetchReport;
use quake_model::IssueKind;
use quake_store::QueryOutcome;
use quake_transform::CatalogStats;

use crate::types::{ExportSummary, FileOutcome, LoadResult, QueryRun};

pub fn print_load_summary(result: &LoadResult) {
    if result.dry_run {
        println!("Dry run: nothing written to {}", result.db.display());
    } else {
        println!("Database: {} (table {})", result.db.display(), result.table);
    }
    println!("{}", load_table(result));

    let merge = &result.merge;
    println!(
        "Merged {} rows from {} files: {} dropped (missing required), {} duplicates, {} out",
        merge.rows_in, merge.tables, merge.dropped_missing_required, merge.removed_duplicate, merge.rows_out
    );
    if let Some(insert) = &result.insert {
        println!(
            "Inserted {} of {} rows ({} already stored)",
            insert.inserted, insert.attempted, insert.skipped_existing
        );
    }
    if let Some(run) = &result.queries {
        print_query_run(run);
    }
    if let Some(export) = &result.export {
        print_export(export);
    }

    let issues = issue_rows(result);
    if !issues.is_empty() {
        println!();
        println!("Issues:");
        println!("{}", issue_table(&issues));
    }
    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

/// Per-file counts, including each file's inserted rows, followed by a TOTAL row.
pub fn load_table(result: &LoadResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Source"),
        header_cell("Time parse"),
        header_cell("Read"),
        header_cell("Dropped"),
        header_cell("Duplicates"),
        header_cell("Out"),
        header_cell("Inserted"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..=7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 8, CellAlignment::Center);

    let (mut read, mut dropped, mut duplicates, mut out) = (0usize, 0usize, 0usize, 0usize);
    for file in &result.files {
        let name = file_label(&file.path);
        let source = Cell::new(file.source.as_str()).fg(Color::Blue);
        match &file.outcome {
            FileOutcome::Normalized(summary) => {
                read += summary.rows_read;
                dropped += summary.dropped_missing_required;
                duplicates += summary.removed_duplicate;
                out += summary.rows_out;
                let status = if summary.issues.is_empty() {
                    Cell::new("ok").fg(Color::Green)
                } else {
                    Cell::new("issues").fg(Color::Yellow)
                };
                table.add_row(vec![
                    Cell::new(name),
                    source,
                    dim_cell(summary.time_stage.as_str()),
                    Cell::new(summary.rows_read),
                    count_cell(Some(summary.dropped_missing_required), Color::Yellow),
                    count_cell(Some(summary.removed_duplicate), Color::Yellow),
                    Cell::new(summary.rows_out),
                    inserted_cell(file.insert.map(|insert| insert.inserted)),
                    status,
                ]);
            }
            FileOutcome::Failed(_) => {
                table.add_row(vec![
                    Cell::new(name),
                    source,
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new("failed")
                        .fg(Color::Red)
                        .add_attribute(Attribute::Bold),
                ]);
            }
        }
    }
    let failed = result.failed_files();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} files", result.files.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(read).add_attribute(Attribute::Bold),
        count_cell(Some(dropped), Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(Some(duplicates), Color::Yellow).add_attribute(Attribute::Bold),
        Cell::new(out).add_attribute(Attribute::Bold),
        inserted_cell(result.insert.map(|insert| insert.inserted)).add_attribute(Attribute::Bold),
        if failed > 0 {
            Cell::new(format!("{failed} failed")).fg(Color::Red)
        } else {
            dim_cell("-")
        },
    ]);
    table
}

/// One line of the issue table: nulled values for a file, column and cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRow {
    pub file: String,
    pub column: &'static str,
    pub cause: &'static str,
    pub count: usize,
    pub examples: String,
}

/// Field issues of every normalized file, in file order.
pub fn issue_rows(result: &LoadResult) -> Vec<IssueRow> {
    let mut rows = Vec::new();
    for file in &result.files {
        let FileOutcome::Normalized(summary) = &file.outcome else {
            continue;
        };
        for issue in &summary.issues {
            rows.push(IssueRow {
                file: file_label(&file.path),
                column: issue.column.name(),
                cause: issue_cause(issue.kind),
                count: issue.count,
                examples: issue.examples.join(", "),
            });
        }
    }
    rows
}

fn issue_table(rows: &[IssueRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Column"),
        header_cell("Cause"),
        header_cell("Count"),
        header_cell("Examples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.file),
            Cell::new(row.column),
            Cell::new(row.cause).fg(Color::Yellow),
            Cell::new(row.count).fg(Color::Yellow),
            if row.examples.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(&row.examples)
            },
        ]);
    }
    table
}

fn issue_cause(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::Unparseable => "unparseable",
        IssueKind::UnknownSource => "unknown source",
    }
}

pub fn print_query_run(run: &QueryRun) {
    match run {
        QueryRun::MissingFile(path) => {
            println!("Query file not found: {} (skipped)", path.display());
        }
        QueryRun::Ran(outcomes) if outcomes.is_empty() => println!("No named queries found"),
        QueryRun::Ran(outcomes) => {
            println!();
            println!("Queries:");
            println!("{}", query_table(outcomes));
        }
    }
}

pub fn query_table(outcomes: &[QueryOutcome]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Query"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Output"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for outcome in outcomes {
        let row = match outcome {
            QueryOutcome::Written { name, path, rows } => vec![
                Cell::new(name),
                Cell::new("written").fg(Color::Green),
                Cell::new(rows),
                Cell::new(path.display()),
            ],
            QueryOutcome::Skipped { name } => vec![
                Cell::new(name),
                Cell::new("skipped").fg(Color::Yellow),
                dim_cell("-"),
                dim_cell("not a SELECT"),
            ],
            QueryOutcome::Failed { name, message } => vec![
                Cell::new(name),
                Cell::new("failed")
                    .fg(Color::Red)
                    .add_attribute(Attribute::Bold),
                dim_cell("-"),
                Cell::new(message).fg(Color::Red),
            ],
        };
        table.add_row(row);
    }
    table
}

pub fn print_export(export: &ExportSummary) {
    println!("Exported {} rows to {}", export.rows, export.path.display());
}

pub fn print_fetch(report: &FetchReport) {
    println!(
        "Saved {} events ({} bytes) to {}",
        report.rows,
        report.bytes,
        report.path.display()
    );
}

pub fn print_stats(table_name: &str, stats: &CatalogStats) {
    println!("Table: {table_name} ({} records)", stats.records);
    println!("{}", numeric_stats_table(stats));
    println!("{}", counts_table(stats));
}

/// count / mean / std / min / max per numeric column.
pub fn numeric_stats_table(stats: &CatalogStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Count"),
        header_cell("Mean"),
        header_cell("Std"),
        header_cell("Min"),
        header_cell("Max"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for column in &stats.numeric {
        table.add_row(vec![
            Cell::new(column.column.name()).fg(Color::Blue),
            Cell::new(column.count),
            stat_cell(column.mean),
            stat_cell(column.std),
            stat_cell(column.min),
            stat_cell(column.max),
        ]);
    }
    table
}

/// Missing values per column and records per source side by side.
pub fn counts_table(stats: &CatalogStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Missing"),
        header_cell("Source"),
        header_cell("Records"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let height = stats.missing.len().max(stats.per_source.len());
    for index in 0..height {
        let (column, missing) = match stats.missing.get(index) {
            Some((column, count)) => (
                Cell::new(column.name()),
                count_cell(Some(*count), Color::Yellow),
            ),
            None => (Cell::new(""), Cell::new("")),
        };
        let (source, records) = match stats.per_source.get(index) {
            Some((source, count)) => (Cell::new(source.as_str()).fg(Color::Blue), Cell::new(count)),
            None => (Cell::new(""), Cell::new("")),
        };
        table.add_row(vec![column, missing, source, records]);
    }
    table
}

fn stat_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format!("{value:.3}")),
        None => dim_cell("-"),
    }
}

fn inserted_cell(inserted: Option<usize>) -> Cell {
    match inserted {
        Some(value) if value > 0 => Cell::new(value).fg(Color::Green),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
