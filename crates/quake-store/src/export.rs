//! Query results to CSV.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use rusqlite::Connection;
use rusqlite::types::ValueRef;
use tracing::debug;

use crate::error::{Result, StoreError};

/// UTF-8 byte order mark written ahead of the header so spreadsheet tools
/// pick the right encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> StoreError + '_ {
    move |source| StoreError::CsvWrite {
        path: path.to_path_buf(),
        source,
    }
}

/// Renders one SQLite value as CSV text. NULL becomes an empty cell.
fn value_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Runs `sql` and writes every result row, with a header, to `path`.
/// Parent directories are created. Returns the number of data rows.
pub(crate) fn write_query_csv(conn: &Connection, sql: &str, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let mut stmt = conn.prepare(sql)?;
    let headers: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut file = File::create(path).map_err(io_error(path))?;
    file.write_all(UTF8_BOM).map_err(io_error(path))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(&headers).map_err(csv_error(path))?;

    let mut rows = stmt.query([])?;
    let mut count = 0usize;
    while let Some(row) = rows.next()? {
        let cells = (0..headers.len())
            .map(|index| row.get_ref(index).map(value_text))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        writer.write_record(&cells).map_err(csv_error(path))?;
        count += 1;
    }
    writer.flush().map_err(io_error(path))?;
    debug!(path = %path.display(), rows = count, "query exported");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (a INTEGER, b TEXT, c REAL);
             INSERT INTO t VALUES (1, 'x,y', 2.5), (2, NULL, NULL);",
        )
        .unwrap();
        let path = dir.path().join("nested/out.csv");
        let rows = write_query_csv(&conn, "SELECT * FROM t ORDER BY a", &path).unwrap();
        assert_eq!(rows, 2);

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "a,b,c\n1,\"x,y\",2.5\n2,,\n");
    }
}
