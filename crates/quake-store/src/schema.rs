//! DDL for the earthquake table, derived from the canonical schema.

use quake_model::{CanonicalColumn, FieldKind};

use crate::error::{Result, StoreError};

/// Default table name.
pub const DEFAULT_TABLE: &str = "earthquakes";

const MAX_TABLE_NAME_LEN: usize = 64;

/// Columns that get a secondary index.
const INDEXED: [CanonicalColumn; 3] = [
    CanonicalColumn::Time,
    CanonicalColumn::Region,
    CanonicalColumn::Magnitude,
];

/// Accepts plain SQL identifiers only: a letter or `_`, then letters,
/// digits or `_`.
pub fn validate_table_name(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    let valid_tail = chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if valid_head && valid_tail && name.len() <= MAX_TABLE_NAME_LEN {
        Ok(name)
    } else {
        Err(StoreError::InvalidTableName {
            name: name.to_string(),
        })
    }
}

/// Double-quoted identifier. Callers validate names first.
pub(crate) fn quoted(name: &str) -> String {
    format!("\"{name}\"")
}

fn sql_type(column: CanonicalColumn) -> &'static str {
    match column.kind() {
        FieldKind::Numeric => "REAL",
        FieldKind::Provenance | FieldKind::Timestamp | FieldKind::Text => "TEXT",
    }
}

/// Comma-separated quoted canonical column names in persisted order.
pub(crate) fn column_list() -> String {
    CanonicalColumn::ALL
        .iter()
        .map(|column| quoted(column.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `CREATE TABLE IF NOT EXISTS` plus its indexes, safe to run repeatedly.
pub fn create_table_sql(table: &str) -> Result<String> {
    let table = validate_table_name(table)?;
    let mut columns = vec!["\"id\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    for column in CanonicalColumn::ALL {
        let not_null = if column.is_required() { " NOT NULL" } else { "" };
        columns.push(format!("{} {}{not_null}", quoted(column.name()), sql_type(column)));
    }
    let key = CanonicalColumn::DEDUP_KEY
        .iter()
        .map(|column| quoted(column.name()))
        .collect::<Vec<_>>()
        .join(", ");
    columns.push(format!("UNIQUE ({key})"));

    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);\n",
        quoted(table),
        columns.join(",\n    ")
    );
    for column in INDEXED {
        sql.push_str(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({});\n",
            quoted(&format!("ix_{table}_{}", column.name())),
            quoted(table),
            quoted(column.name())
        ));
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names() {
        assert!(validate_table_name("earthquakes").is_ok());
        assert!(validate_table_name("_quakes_2025").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2025").is_err());
        assert!(validate_table_name("quakes; DROP TABLE x").is_err());
        assert!(validate_table_name("quakes\"").is_err());
        assert!(validate_table_name(&"a".repeat(65)).is_err());
    }

    #[test]
    fn ddl_declares_constraints() {
        let sql = create_table_sql("earthquakes").unwrap();
        assert!(sql.contains("\"source\" TEXT NOT NULL"));
        assert!(sql.contains("\"latitude\" REAL NOT NULL"));
        assert!(sql.contains("\"depth\" REAL,"));
        assert!(sql.contains("\"dist_to_Tokyo\" REAL"));
        assert!(sql.contains("UNIQUE (\"source\", \"time\", \"latitude\", \"longitude\")"));
        assert!(sql.contains("\"ix_earthquakes_magnitude\""));
    }
}
