use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::record::EarthquakeRecord;
use crate::schema::CanonicalColumn;
use crate::source::SourceTag;

/// Cell spellings treated as null when reading raw tables.
const NULL_TOKENS: [&str; 8] = ["NA", "N/A", "NAN", "NULL", "NONE", "<NA>", "NAT", "-NAN"];

/// Returns true when a raw cell carries no value.
#[must_use]
pub fn is_null_cell(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || NULL_TOKENS
            .iter()
            .any(|token| token.eq_ignore_ascii_case(trimmed))
}

/// A table as produced by a source extractor: header names plus string cells.
///
/// Header names may repeat. Every row has exactly the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding missing trailing cells with empty strings.
    /// Readers reject rows with values beyond the header before this point.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Cell value, or `None` when out of range or null.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        let value = self.rows.get(row)?.get(column)?;
        if is_null_cell(value) {
            None
        } else {
            Some(value.trim())
        }
    }

    /// Column values by position with null cells as `None`.
    #[must_use]
    pub fn column_values(&self, column: usize) -> Vec<Option<String>> {
        (0..self.height())
            .map(|row| self.cell(row, column).map(str::to_string))
            .collect()
    }
}

/// One normalized row. Required fields may still be null here; the merge
/// step drops rows that cannot become an [`EarthquakeRecord`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub source: SourceTag,
    pub time: Option<NaiveDateTime>,
    pub month: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth: Option<f64>,
    pub magnitude: Option<f64>,
    pub region: Option<String>,
    pub dist_to_tokyo: Option<f64>,
}

impl CanonicalRow {
    /// Required columns that are null on this row.
    #[must_use]
    pub fn missing_required(&self) -> Vec<CanonicalColumn> {
        let mut missing = Vec::new();
        if self.time.is_none() {
            missing.push(CanonicalColumn::Time);
        }
        if self.latitude.is_none() {
            missing.push(CanonicalColumn::Latitude);
        }
        if self.longitude.is_none() {
            missing.push(CanonicalColumn::Longitude);
        }
        missing
    }

    /// Numeric value of a numeric canonical column.
    #[must_use]
    pub fn numeric(&self, column: CanonicalColumn) -> Option<f64> {
        match column {
            CanonicalColumn::Latitude => self.latitude,
            CanonicalColumn::Longitude => self.longitude,
            CanonicalColumn::Depth => self.depth,
            CanonicalColumn::Magnitude => self.magnitude,
            CanonicalColumn::DistToTokyo => self.dist_to_tokyo,
            _ => None,
        }
    }
}

impl From<EarthquakeRecord> for CanonicalRow {
    fn from(record: EarthquakeRecord) -> Self {
        Self {
            source: record.source,
            time: Some(record.time),
            month: record.month,
            category: record.category,
            latitude: Some(record.latitude),
            longitude: Some(record.longitude),
            depth: record.depth,
            magnitude: record.magnitude,
            region: record.region,
            dist_to_tokyo: record.dist_to_tokyo,
        }
    }
}

/// Rows of a single source batch in canonical shape, insertion order kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTable {
    /// Identifier of the batch (usually the file name).
    pub label: String,
    pub rows: Vec<CanonicalRow>,
}

impl CanonicalTable {
    pub fn new(label: impl Into<String>, rows: Vec<CanonicalRow>) -> Self {
        Self {
            label: label.into(),
            rows,
        }
    }

    pub fn from_records(label: impl Into<String>, records: Vec<EarthquakeRecord>) -> Self {
        Self::new(label, records.into_iter().map(CanonicalRow::from).collect())
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_tokens() {
        for value in ["", "  ", "NaN", "nan", "None", "NULL", "N/A", "<NA>"] {
            assert!(is_null_cell(value), "{value:?} should be null");
        }
        assert!(!is_null_cell("0"));
        assert!(!is_null_cell("Nankai"));
    }

    #[test]
    fn raw_table_pads_short_rows() {
        let mut table = RawTable::new(vec!["a".into(), "b".into(), "c".into()]);
        table.push_row(vec!["1".into()]);
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.cell(0, 0), Some("1"));
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(5, 0), None);
    }

    #[test]
    fn missing_required_lists_null_keys() {
        let row = CanonicalRow {
            latitude: Some(35.0),
            ..CanonicalRow::default()
        };
        assert_eq!(
            row.missing_required(),
            vec![CanonicalColumn::Time, CanonicalColumn::Longitude]
        );
    }
}
