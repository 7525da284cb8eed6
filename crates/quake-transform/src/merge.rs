//! Dataset Merger: concatenation, required-field filtering, dedup.

use std::collections::HashSet;

use tracing::{debug, info};

use quake_model::{CanonicalRow, CanonicalTable, DedupKey, EarthquakeRecord, MergeSummary};

/// Rows that passed validation plus what was removed on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Filtered {
    pub records: Vec<EarthquakeRecord>,
    pub dropped_missing_required: usize,
    pub removed_duplicate: usize,
}

/// Drops rows missing a required field, then keeps the first row per dedup key.
pub(crate) fn filter_and_dedup(rows: impl IntoIterator<Item = CanonicalRow>) -> Filtered {
    let mut filtered = Filtered::default();
    filter_into(&mut filtered, &mut HashSet::new(), rows);
    filtered
}

fn filter_into(
    filtered: &mut Filtered,
    seen: &mut HashSet<DedupKey>,
    rows: impl IntoIterator<Item = CanonicalRow>,
) {
    for row in rows {
        let record = match EarthquakeRecord::try_from(row) {
            Ok(record) => record,
            Err(error) => {
                debug!(%error, "dropping row");
                filtered.dropped_missing_required += 1;
                continue;
            }
        };
        if seen.insert(record.dedup_key()) {
            filtered.records.push(record);
        } else {
            filtered.removed_duplicate += 1;
        }
    }
}

/// Merged records and the accounting for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub records: Vec<EarthquakeRecord>,
    /// Records kept from each input table, in input order. Records of one
    /// table are contiguous in `records`.
    pub per_table: Vec<usize>,
    pub summary: MergeSummary,
}

impl MergeOutcome {
    /// Records as a single canonical table.
    #[must_use]
    pub fn to_table(&self, label: impl Into<String>) -> CanonicalTable {
        CanonicalTable::from_records(label, self.records.clone())
    }

    /// Records split back into one slice per input table.
    #[must_use]
    pub fn batches(&self) -> Vec<&[EarthquakeRecord]> {
        let mut rest = self.records.as_slice();
        self.per_table
            .iter()
            .map(|&count| {
                let (batch, tail) = rest.split_at(count.min(rest.len()));
                rest = tail;
                batch
            })
            .collect()
    }
}

/// Concatenates tables in the given order and de-duplicates across all of them.
///
/// Row order inside each table is preserved and the first occurrence of a
/// dedup key wins. The same input always yields the same output.
pub fn merge_tables(tables: &[CanonicalTable]) -> MergeOutcome {
    let rows_in: usize = tables.iter().map(CanonicalTable::height).sum();
    let mut filtered = Filtered::default();
    let mut seen = HashSet::new();
    let mut per_table = Vec::with_capacity(tables.len());
    for table in tables {
        let before = filtered.records.len();
        filter_into(&mut filtered, &mut seen, table.rows.iter().cloned());
        per_table.push(filtered.records.len() - before);
    }
    let summary = MergeSummary {
        tables: tables.len(),
        rows_in,
        dropped_missing_required: filtered.dropped_missing_required,
        removed_duplicate: filtered.removed_duplicate,
        rows_out: filtered.records.len(),
    };
    info!(
        tables = summary.tables,
        rows_in = summary.rows_in,
        dropped_missing_required = summary.dropped_missing_required,
        removed_duplicate = summary.removed_duplicate,
        rows_out = summary.rows_out,
        "merge complete"
    );
    MergeOutcome {
        records: filtered.records,
        per_table,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use quake_model::SourceTag;

    use super::*;

    fn row(source: SourceTag, day: u32, lat: Option<f64>, lon: f64) -> CanonicalRow {
        CanonicalRow {
            source,
            time: NaiveDate::from_ymd_opt(2025, 10, day)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            latitude: lat,
            longitude: Some(lon),
            ..CanonicalRow::default()
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let mut first = row(SourceTag::Usgs, 1, Some(35.0), 139.0);
        first.region = Some("first".into());
        let mut second = first.clone();
        second.region = Some("second".into());
        let filtered = filter_and_dedup(vec![first, second]);
        assert_eq!(filtered.records.len(), 1);
        assert_eq!(filtered.removed_duplicate, 1);
        assert_eq!(filtered.records[0].region.as_deref(), Some("first"));
    }

    #[test]
    fn same_point_from_different_sources_is_kept() {
        let rows = vec![
            row(SourceTag::Usgs, 1, Some(35.0), 139.0),
            row(SourceTag::Emsc, 1, Some(35.0), 139.0),
        ];
        assert_eq!(filter_and_dedup(rows).records.len(), 2);
    }

    #[test]
    fn signed_zero_coordinates_collide() {
        let rows = vec![
            row(SourceTag::Api, 2, Some(0.0), 139.0),
            row(SourceTag::Api, 2, Some(-0.0), 139.0),
        ];
        let filtered = filter_and_dedup(rows);
        assert_eq!(filtered.records.len(), 1);
        assert_eq!(filtered.removed_duplicate, 1);
    }

    #[test]
    fn merge_counts_balance() {
        let a = CanonicalTable::new(
            "a.csv",
            vec![
                row(SourceTag::Usgs, 1, Some(35.0), 139.0),
                row(SourceTag::Usgs, 2, None, 139.0),
            ],
        );
        let b = CanonicalTable::new("b.csv", vec![row(SourceTag::Usgs, 1, Some(35.0), 139.0)]);
        let outcome = merge_tables(&[a, b]);
        assert_eq!(
            outcome.summary,
            MergeSummary {
                tables: 2,
                rows_in: 3,
                dropped_missing_required: 1,
                removed_duplicate: 1,
                rows_out: 1,
            }
        );
        assert!(outcome.summary.is_balanced());
        assert_eq!(outcome.per_table, vec![1, 0]);
    }

    #[test]
    fn batches_follow_input_tables() {
        let a = CanonicalTable::new(
            "a.csv",
            vec![
                row(SourceTag::Usgs, 1, Some(35.0), 139.0),
                row(SourceTag::Usgs, 2, Some(35.0), 139.0),
            ],
        );
        let b = CanonicalTable::new("b.csv", vec![row(SourceTag::Usgs, 2, Some(35.0), 139.0)]);
        let c = CanonicalTable::new("c.csv", vec![row(SourceTag::Emsc, 2, Some(35.0), 139.0)]);
        let outcome = merge_tables(&[a, b, c]);
        let batches = outcome.batches();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 2);
        assert!(batches[1].is_empty());
        assert_eq!(batches[2][0].source, SourceTag::Emsc);
    }

    #[test]
    fn empty_merge() {
        let outcome = merge_tables(&[]);
        assert!(outcome.records.is_empty());
        assert!(outcome.batches().is_empty());
        assert!(outcome.summary.is_balanced());
    }
}
