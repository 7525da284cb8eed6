//! Row accounting for normalization and merge runs.

use serde::{Deserialize, Serialize};

use crate::schema::CanonicalColumn;

/// Maximum number of raw example values kept per field issue.
pub const MAX_ISSUE_EXAMPLES: usize = 3;

/// Timestamp parsing stage that produced a batch's `time` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeParseStage {
    /// Offset-aware parse; naive values are read as UTC.
    #[default]
    Utc,
    /// Naive parse that also accepts month-first dates.
    Naive,
    /// Naive parse resolving ambiguous dates day-first.
    DayFirst,
}

impl TimeParseStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utc => "utc",
            Self::Naive => "naive",
            Self::DayFirst => "day-first",
        }
    }
}

/// Why a field value was nulled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// Present but not parseable as the column's type.
    Unparseable,
    /// Provenance label matched no known catalog.
    UnknownSource,
}

/// Count of nulled values attributed to one column and cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub column: CanonicalColumn,
    pub kind: IssueKind,
    pub count: usize,
    /// First few offending raw values.
    pub examples: Vec<String>,
}

impl FieldIssue {
    pub fn new(column: CanonicalColumn, kind: IssueKind) -> Self {
        Self {
            column,
            kind,
            count: 0,
            examples: Vec::new(),
        }
    }

    pub fn record(&mut self, raw: &str) {
        self.count += 1;
        if self.examples.len() < MAX_ISSUE_EXAMPLES {
            self.examples.push(raw.to_string());
        }
    }
}

/// Counts for one normalized source batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub rows_read: usize,
    pub dropped_missing_required: usize,
    pub removed_duplicate: usize,
    pub rows_out: usize,
    pub time_stage: TimeParseStage,
    pub issues: Vec<FieldIssue>,
}

impl BatchSummary {
    /// `rows_out == rows_read - dropped - duplicates`.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.rows_read
            .checked_sub(self.dropped_missing_required + self.removed_duplicate)
            == Some(self.rows_out)
    }

    /// Total values nulled for the given column.
    #[must_use]
    pub fn nulled(&self, column: CanonicalColumn) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.column == column)
            .map(|issue| issue.count)
            .sum()
    }
}

/// Counts for one merge of several canonical tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub tables: usize,
    pub rows_in: usize,
    pub dropped_missing_required: usize,
    pub removed_duplicate: usize,
    pub rows_out: usize,
}

impl MergeSummary {
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.rows_in
            .checked_sub(self.dropped_missing_required + self.removed_duplicate)
            == Some(self.rows_out)
    }
}
