//! CSV reading into [`RawTable`]s.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use quake_model::RawTable;

use crate::error::{CsvReadError, IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim()
        .trim_matches('\u{feff}')
        .to_string()
}

/// Reads a CSV file. The first non-blank row is the header.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let parse_error = |source: CsvReadError| IngestError::CsvParse {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|source| parse_error(csv::Error::from(source).into()))?;
    let table = read_raw_table_from_reader(file).map_err(parse_error)?;
    if table.headers.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    debug!(
        path = %path.display(),
        columns = table.width(),
        rows = table.height(),
        "read csv"
    );
    Ok(table)
}

/// Reads CSV from any reader. Invalid UTF-8 is replaced rather than rejected.
/// An input with no rows yields an empty table.
///
/// Blank lines are skipped. A data row whose cells are all empty is kept so
/// that it is counted and later dropped for missing required fields. Rows
/// shorter than the header are padded; surplus cells are accepted only when
/// empty (trailing separators).
pub fn read_raw_table_from_reader<R: Read>(
    reader: R,
) -> std::result::Result<RawTable, CsvReadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut table: Option<RawTable> = None;
    for record in reader.byte_records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(normalize_cell).collect();
        let Some(current) = table.as_mut() else {
            if row.iter().any(|value| !value.is_empty()) {
                let headers = row.iter().map(|value| normalize_header(value)).collect();
                table = Some(RawTable::new(headers));
            }
            continue;
        };
        if row.len() == 1 && row[0].is_empty() {
            continue;
        }
        let width = current.width();
        if row.len() > width {
            if row[width..].iter().any(|value| !value.is_empty()) {
                return Err(CsvReadError::ExtraFields {
                    line: record.position().map_or(0, csv::Position::line),
                    expected: width,
                    found: row.len(),
                });
            }
            row.truncate(width);
        }
        current.push_row(row);
    }
    Ok(table.unwrap_or_default())
}
