//! Basic aggregate summaries over canonical records.

use polars::prelude::{ChunkAgg, ChunkVar, Column, DataFrame, IntoColumn, NamedFrom, Series};

use quake_model::{CanonicalColumn, EarthquakeRecord, SourceTag, TIME_FORMAT};

use crate::error::Result;

/// Count, mean, sample standard deviation and range of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: CanonicalColumn,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Aggregates for a set of records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogStats {
    pub records: usize,
    pub numeric: Vec<ColumnStats>,
    /// Null count per canonical column, in canonical order.
    pub missing: Vec<(CanonicalColumn, usize)>,
    /// Record count per provenance tag; tags without records are omitted.
    pub per_source: Vec<(SourceTag, usize)>,
}

fn numeric_column(column: CanonicalColumn, records: &[EarthquakeRecord]) -> Column {
    let values: Vec<Option<f64>> = records
        .iter()
        .map(|record| match column {
            CanonicalColumn::Latitude => Some(record.latitude),
            CanonicalColumn::Longitude => Some(record.longitude),
            CanonicalColumn::Depth => record.depth,
            CanonicalColumn::Magnitude => record.magnitude,
            CanonicalColumn::DistToTokyo => record.dist_to_tokyo,
            _ => None,
        })
        .collect();
    Series::new(column.name().into(), values).into_column()
}

fn text_column(column: CanonicalColumn, records: &[EarthquakeRecord]) -> Column {
    let values: Vec<Option<String>> = records
        .iter()
        .map(|record| match column {
            CanonicalColumn::Source => Some(record.source.as_str().to_string()),
            CanonicalColumn::Time => Some(record.time.format(TIME_FORMAT).to_string()),
            CanonicalColumn::Month => record.month.clone(),
            CanonicalColumn::Category => record.category.clone(),
            CanonicalColumn::Region => record.region.clone(),
            _ => None,
        })
        .collect();
    Series::new(column.name().into(), values).into_column()
}

/// Builds a frame with one column per canonical field, in canonical order.
pub fn records_frame(records: &[EarthquakeRecord]) -> Result<DataFrame> {
    let columns: Vec<Column> = CanonicalColumn::ALL
        .iter()
        .map(|column| {
            if CanonicalColumn::NUMERIC.contains(column) {
                numeric_column(*column, records)
            } else {
                text_column(*column, records)
            }
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn column_stats(frame: &DataFrame, column: CanonicalColumn) -> Result<ColumnStats> {
    let series = frame.column(column.name())?.as_materialized_series();
    let values = series.f64()?;
    Ok(ColumnStats {
        column,
        count: values.len() - values.null_count(),
        mean: series.mean(),
        std: values.std(1),
        min: values.min(),
        max: values.max(),
    })
}

/// Summarizes records: numeric aggregates, missing counts and per-source counts.
pub fn summarize(records: &[EarthquakeRecord]) -> Result<CatalogStats> {
    let frame = records_frame(records)?;
    let numeric = CanonicalColumn::NUMERIC
        .iter()
        .map(|column| column_stats(&frame, *column))
        .collect::<Result<Vec<_>>>()?;
    let missing = CanonicalColumn::ALL
        .iter()
        .map(|column| -> Result<(CanonicalColumn, usize)> {
            Ok((*column, frame.column(column.name())?.null_count()))
        })
        .collect::<Result<Vec<_>>>()?;

    let sources = frame
        .column(CanonicalColumn::Source.name())?
        .as_materialized_series()
        .str()?;
    let per_source = SourceTag::ALL
        .iter()
        .map(|tag| {
            let count = sources
                .into_iter()
                .filter(|value| *value == Some(tag.as_str()))
                .count();
            (*tag, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();

    Ok(CatalogStats {
        records: frame.height(),
        numeric,
        missing,
        per_source,
    })
}
