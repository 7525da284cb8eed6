//! Row Normalizer: one raw table in, one canonical table out.
//!
//! Steps run in a fixed order:
//! 1. provenance fill from the source hint
//! 2. rename through the column map
//! 3. coalesce duplicate canonical columns (first non-null, left to right)
//! 4. create missing canonical columns as null
//! 5. timestamp parse with stage fallback
//! 6. distance decoration stripping
//! 7. numeric coercion
//! 8. month derivation when the whole column is null
//! 9. projection in canonical order
//! 10. optional distance derivation
//! 11. required-field filter and in-batch dedup
//!
//! Normalization never fails. Every nulled value is attributed to a column
//! and a cause in the batch summary.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::{debug, info, info_span, warn};

use quake_map::MappingProfile;
use quake_model::{
    BatchSummary, CanonicalColumn, CanonicalRow, CanonicalTable, FieldIssue, IssueKind, RawTable,
    SourceTag,
};

use crate::datetime::{month_name, parse_time_column};
use crate::fields::{FieldValue, parse_decorated_numeric, parse_numeric, parse_text};
use crate::geo::dist_to_tokyo;
use crate::merge::filter_and_dedup;

/// Name of the provenance column filled before renaming.
const SOURCE_COLUMN: &str = "source";

/// Switches for optional normalization steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Fill a null `dist_to_Tokyo` from the coordinates.
    pub derive_missing_distance: bool,
}

/// Output of normalizing one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub table: CanonicalTable,
    pub summary: BatchSummary,
}

/// A raw column after provenance fill, before renaming.
struct WorkingColumn {
    name: String,
    values: Vec<Option<String>>,
}

/// Coalesced string values per canonical column.
type CanonicalColumns = BTreeMap<CanonicalColumn, Vec<Option<String>>>;

#[derive(Default)]
struct IssueLog {
    issues: BTreeMap<(CanonicalColumn, IssueKind), FieldIssue>,
}

impl IssueLog {
    fn record(&mut self, column: CanonicalColumn, kind: IssueKind, raw: &str) {
        debug!(column = %column, raw, "value nulled");
        self.issues
            .entry((column, kind))
            .or_insert_with(|| FieldIssue::new(column, kind))
            .record(raw);
    }

    fn track<T>(&mut self, column: CanonicalColumn, value: FieldValue<T>) -> Option<T> {
        if let Some(raw) = value.rejected() {
            self.record(column, IssueKind::Unparseable, raw);
        }
        value.into_option()
    }

    fn into_issues(self) -> Vec<FieldIssue> {
        self.issues.into_values().collect()
    }
}

/// Normalizes raw tables against a shared, read-only mapping profile.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    profile: &'a MappingProfile,
    options: NormalizeOptions,
}

impl<'a> Normalizer<'a> {
    pub fn new(profile: &'a MappingProfile, options: NormalizeOptions) -> Self {
        Self { profile, options }
    }

    #[must_use]
    pub fn profile(&self) -> &MappingProfile {
        self.profile
    }

    #[must_use]
    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    /// Normalizes one raw table. `source_hint` is usually the file name and
    /// only supplies provenance where the data has none.
    pub fn normalize(&self, raw: &RawTable, source_hint: &str) -> NormalizedBatch {
        let span = info_span!("normalize", batch = %source_hint);
        let _guard = span.enter();

        let fallback = self.profile.sources.infer(source_hint);
        let mut issues = IssueLog::default();
        let working = fill_provenance(raw, fallback);
        let columns = self.coalesce(working, raw.height());
        let time = parse_time_column(values(&columns, CanonicalColumn::Time));
        debug!(stage = time.stage.as_str(), "time column parsed");

        let rows = self.project(&columns, time.values, fallback, &mut issues);
        let rows_read = rows.len();
        let filtered = filter_and_dedup(rows);

        let summary = BatchSummary {
            rows_read,
            dropped_missing_required: filtered.dropped_missing_required,
            removed_duplicate: filtered.removed_duplicate,
            rows_out: filtered.records.len(),
            time_stage: time.stage,
            issues: issues.into_issues(),
        };
        for issue in &summary.issues {
            warn!(
                column = %issue.column,
                cause = ?issue.kind,
                count = issue.count,
                examples = ?issue.examples,
                "values nulled"
            );
        }
        info!(
            source = %fallback,
            rows_read = summary.rows_read,
            dropped_missing_required = summary.dropped_missing_required,
            removed_duplicate = summary.removed_duplicate,
            rows_out = summary.rows_out,
            "normalize complete"
        );

        NormalizedBatch {
            table: CanonicalTable::from_records(source_hint, filtered.records),
            summary,
        }
    }

    /// Renames through the column map, coalesces duplicates left to right and
    /// creates absent canonical columns as all-null.
    fn coalesce(&self, working: Vec<WorkingColumn>, height: usize) -> CanonicalColumns {
        let mut columns = CanonicalColumns::new();
        for column in working {
            let Some(canonical) = self.profile.columns.resolve(&column.name) else {
                debug!(column = %column.name, "unmapped column discarded");
                continue;
            };
            match columns.get_mut(&canonical) {
                None => {
                    columns.insert(canonical, column.values);
                }
                Some(existing) => {
                    for (slot, value) in existing.iter_mut().zip(column.values) {
                        if slot.is_none() {
                            *slot = value;
                        }
                    }
                }
            }
        }
        for canonical in CanonicalColumn::ALL {
            columns.entry(canonical).or_insert_with(|| vec![None; height]);
        }
        columns
    }

    /// Parses every canonical field and builds rows in canonical order.
    fn project(
        &self,
        columns: &CanonicalColumns,
        times: Vec<FieldValue<NaiveDateTime>>,
        fallback: SourceTag,
        issues: &mut IssueLog,
    ) -> Vec<CanonicalRow> {
        let derive_month = values(columns, CanonicalColumn::Month)
            .iter()
            .all(Option::is_none);

        let mut rows = Vec::with_capacity(times.len());
        for (index, time_value) in times.into_iter().enumerate() {
            let cell = |column: CanonicalColumn| {
                values(columns, column)
                    .get(index)
                    .and_then(|value| value.as_deref())
            };
            let time = issues.track(CanonicalColumn::Time, time_value);
            let source = self.resolve_source(cell(CanonicalColumn::Source), fallback, issues);
            let latitude = issues.track(
                CanonicalColumn::Latitude,
                parse_numeric(cell(CanonicalColumn::Latitude)),
            );
            let longitude = issues.track(
                CanonicalColumn::Longitude,
                parse_numeric(cell(CanonicalColumn::Longitude)),
            );
            let depth = issues.track(
                CanonicalColumn::Depth,
                parse_numeric(cell(CanonicalColumn::Depth)),
            );
            let magnitude = issues.track(
                CanonicalColumn::Magnitude,
                parse_numeric(cell(CanonicalColumn::Magnitude)),
            );
            let mut dist = issues.track(
                CanonicalColumn::DistToTokyo,
                parse_decorated_numeric(cell(CanonicalColumn::DistToTokyo)),
            );
            if self.options.derive_missing_distance
                && dist.is_none()
                && let (Some(lat), Some(lon)) = (latitude, longitude)
            {
                dist = Some(dist_to_tokyo(lat, lon));
            }
            let month = if derive_month {
                time.as_ref().map(month_name)
            } else {
                parse_text(cell(CanonicalColumn::Month))
            };

            rows.push(CanonicalRow {
                source,
                time,
                month,
                category: parse_text(cell(CanonicalColumn::Category)),
                latitude,
                longitude,
                depth,
                magnitude,
                region: parse_text(cell(CanonicalColumn::Region)),
                dist_to_tokyo: dist,
            });
        }
        rows
    }

    fn resolve_source(
        &self,
        label: Option<&str>,
        fallback: SourceTag,
        issues: &mut IssueLog,
    ) -> SourceTag {
        let Some(label) = label.map(str::trim).filter(|label| !label.is_empty()) else {
            return fallback;
        };
        match self.profile.sources.resolve_label(label) {
            Some(tag) => tag,
            None => {
                issues.record(CanonicalColumn::Source, IssueKind::UnknownSource, label);
                SourceTag::Unknown
            }
        }
    }
}

/// Copies the raw columns, filling provenance gaps with `fallback`.
///
/// An existing `source` column keeps its position and only its null cells are
/// filled. Without one, a filled column is appended so that mapped provenance
/// columns earlier in the table still win the coalesce.
fn fill_provenance(raw: &RawTable, fallback: SourceTag) -> Vec<WorkingColumn> {
    let mut working: Vec<WorkingColumn> = raw
        .headers
        .iter()
        .enumerate()
        .map(|(index, name)| WorkingColumn {
            name: name.clone(),
            values: raw.column_values(index),
        })
        .collect();
    let tag = fallback.as_str().to_string();
    match working
        .iter_mut()
        .find(|column| column.name.trim() == SOURCE_COLUMN)
    {
        Some(column) => {
            for value in column.values.iter_mut().filter(|value| value.is_none()) {
                *value = Some(tag.clone());
            }
        }
        None => working.push(WorkingColumn {
            name: SOURCE_COLUMN.to_string(),
            values: vec![Some(tag); raw.height()],
        }),
    }
    working
}

fn values(columns: &CanonicalColumns, column: CanonicalColumn) -> &[Option<String>] {
    columns.get(&column).map(Vec::as_slice).unwrap_or_default()
}
