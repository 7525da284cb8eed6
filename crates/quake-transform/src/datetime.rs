//! Timestamp parsing with a three-stage fallback.
//!
//! Catalog exports disagree on timestamp shape: USGS emits RFC 3339 with a
//! `Z` suffix, EMSC and GEOFON emit naive `YYYY-MM-DD HH:MM:SS[.f]`, and
//! hand-cleaned sheets use slash dates in either month-first or day-first
//! order. Each stage accepts a wider set of layouts; a column falls back to
//! the next stage only when more than half of its rows fail.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use quake_model::TimeParseStage;

use crate::fields::FieldValue;

/// Share of failed rows above which the next stage is attempted.
pub const FALLBACK_FAILURE_RATIO: f64 = 0.5;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
];

const YEAR_FIRST_DATETIME: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const YEAR_FIRST_DATE: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const MONTH_FIRST_DATETIME: &[&str] = &[
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S%.f",
    "%m-%d-%Y %H:%M",
    "%b %d %Y %H:%M:%S%.f",
    "%d %b %Y %H:%M:%S%.f",
];

const MONTH_FIRST_DATE: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%b %d %Y", "%d %b %Y"];

const DAY_FIRST_DATETIME: &[&str] = &[
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
];

const DAY_FIRST_DATE: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

fn try_datetime_formats(value: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn try_date_formats(value: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Drops a trailing `Z` or `UTC` marker from an otherwise naive value.
fn strip_utc_marker(value: &str) -> &str {
    let trimmed = value.trim();
    for marker in [" UTC", "UTC", "Z", "z"] {
        if let Some(head) = trimmed.strip_suffix(marker) {
            return head.trim_end();
        }
    }
    trimmed
}

/// Offset-aware parse converted to UTC; naive year-first values are read as UTC.
pub fn parse_utc(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Some(dt.naive_utc());
    }
    let naive = strip_utc_marker(trimmed);
    try_datetime_formats(naive, YEAR_FIRST_DATETIME).or_else(|| try_date_formats(naive, YEAR_FIRST_DATE))
}

/// Naive parse: everything [`parse_utc`] accepts plus month-first layouts.
pub fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    parse_utc(value).or_else(|| {
        let naive = strip_utc_marker(value);
        try_datetime_formats(naive, MONTH_FIRST_DATETIME)
            .or_else(|| try_date_formats(naive, MONTH_FIRST_DATE))
    })
}

/// Day-first parse: everything [`parse_utc`] accepts plus day-first layouts.
pub fn parse_day_first(value: &str) -> Option<NaiveDateTime> {
    parse_utc(value).or_else(|| {
        let naive = strip_utc_marker(value);
        try_datetime_formats(naive, DAY_FIRST_DATETIME)
            .or_else(|| try_date_formats(naive, DAY_FIRST_DATE))
    })
}

fn parse_stage(stage: TimeParseStage, value: &str) -> Option<NaiveDateTime> {
    match stage {
        TimeParseStage::Utc => parse_utc(value),
        TimeParseStage::Naive => parse_naive(value),
        TimeParseStage::DayFirst => parse_day_first(value),
    }
}

fn parse_with_stage(
    values: &[Option<String>],
    stage: TimeParseStage,
) -> Vec<FieldValue<NaiveDateTime>> {
    values
        .iter()
        .map(|value| FieldValue::from_parse(value.as_deref(), |text| parse_stage(stage, text)))
        .collect()
}

/// Share of rows without a parsed timestamp; missing cells count as failures.
fn failure_ratio(parsed: &[FieldValue<NaiveDateTime>]) -> f64 {
    if parsed.is_empty() {
        return 0.0;
    }
    let failed = parsed.iter().filter(|value| !value.is_present()).count();
    failed as f64 / parsed.len() as f64
}

/// Parsed `time` column and the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeColumn {
    pub values: Vec<FieldValue<NaiveDateTime>>,
    pub stage: TimeParseStage,
}

/// Parses a whole column, falling back stage by stage. The last stage
/// attempted is kept even when it does no better than the previous one.
pub fn parse_time_column(values: &[Option<String>]) -> TimeColumn {
    let mut stage = TimeParseStage::Utc;
    let mut parsed = parse_with_stage(values, stage);
    for next in [TimeParseStage::Naive, TimeParseStage::DayFirst] {
        if failure_ratio(&parsed) <= FALLBACK_FAILURE_RATIO {
            break;
        }
        stage = next;
        parsed = parse_with_stage(values, stage);
    }
    TimeColumn {
        values: parsed,
        stage,
    }
}

/// English month name used for the display-only `month` field.
pub fn month_name(time: &NaiveDateTime) -> String {
    time.format("%B").to_string()
}
