use std::path::PathBuf;

use quake_model::{BatchSummary, MergeSummary, SourceTag};
use quake_store::{InsertSummary, QueryOutcome};

#[derive(Debug)]
pub struct LoadResult {
    pub db: PathBuf,
    pub table: String,
    pub dry_run: bool,
    pub files: Vec<FileSummary>,
    pub merge: MergeSummary,
    /// `None` on dry runs or when the insert failed.
    pub insert: Option<InsertSummary>,
    pub queries: Option<QueryRun>,
    pub export: Option<ExportSummary>,
    pub errors: Vec<String>,
    pub has_errors: bool,
}

impl LoadResult {
    pub fn failed_files(&self) -> usize {
        self.files
            .iter()
            .filter(|file| matches!(file.outcome, FileOutcome::Failed(_)))
            .count()
    }
}

#[derive(Debug)]
pub struct FileSummary {
    pub path: PathBuf,
    /// Tag inferred from the file name.
    pub source: SourceTag,
    pub outcome: FileOutcome,
    /// This file's share of the insert. `None` on dry runs, for failed files
    /// and when the insert failed.
    pub insert: Option<InsertSummary>,
}

#[derive(Debug)]
pub enum FileOutcome {
    Normalized(BatchSummary),
    Failed(String),
}

#[derive(Debug, PartialEq)]
pub enum QueryRun {
    Ran(Vec<QueryOutcome>),
    MissingFile(PathBuf),
}

impl QueryRun {
    pub fn failed(&self) -> usize {
        match self {
            Self::Ran(outcomes) => outcomes.iter().filter(|outcome| outcome.is_failed()).count(),
            Self::MissingFile(_) => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}
