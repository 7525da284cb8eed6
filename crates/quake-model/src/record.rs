use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::source::SourceTag;
use crate::table::CanonicalRow;

/// Text layout for persisted and exported timestamps. Fractional seconds
/// are written only when present.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A validated earthquake observation ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    pub source: SourceTag,
    pub time: NaiveDateTime,
    pub month: Option<String>,
    pub category: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: Option<f64>,
    pub magnitude: Option<f64>,
    pub region: Option<String>,
    #[serde(rename = "dist_to_Tokyo")]
    pub dist_to_tokyo: Option<f64>,
}

impl EarthquakeRecord {
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.source, self.time, self.latitude, self.longitude)
    }
}

impl TryFrom<CanonicalRow> for EarthquakeRecord {
    type Error = ModelError;

    fn try_from(row: CanonicalRow) -> Result<Self, Self::Error> {
        let missing = row.missing_required();
        let (Some(time), Some(latitude), Some(longitude)) = (row.time, row.latitude, row.longitude)
        else {
            return Err(ModelError::MissingRequired { missing });
        };
        Ok(Self {
            source: row.source,
            time,
            month: row.month,
            category: row.category,
            latitude,
            longitude,
            depth: row.depth,
            magnitude: row.magnitude,
            region: row.region,
            dist_to_tokyo: row.dist_to_tokyo,
        })
    }
}

/// Identity of an observation: `(source, time, latitude, longitude)`.
///
/// Coordinates compare by bit pattern after folding `-0.0` into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    source: SourceTag,
    time: NaiveDateTime,
    latitude: u64,
    longitude: u64,
}

impl DedupKey {
    #[must_use]
    pub fn new(source: SourceTag, time: NaiveDateTime, latitude: f64, longitude: f64) -> Self {
        Self {
            source,
            time,
            latitude: coordinate_bits(latitude),
            longitude: coordinate_bits(longitude),
        }
    }
}

fn coordinate_bits(value: f64) -> u64 {
    if value == 0.0 { 0.0f64.to_bits() } else { value.to_bits() }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::schema::CanonicalColumn;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn row_without_time_is_rejected() {
        let row = CanonicalRow {
            source: SourceTag::Emsc,
            latitude: Some(35.0),
            longitude: Some(139.0),
            ..CanonicalRow::default()
        };
        let err = EarthquakeRecord::try_from(row).unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingRequired {
                missing: vec![CanonicalColumn::Time]
            }
        );
        assert_eq!(err.to_string(), "missing required field(s): time");
    }

    #[test]
    fn negative_zero_shares_a_key() {
        let a = DedupKey::new(SourceTag::Usgs, noon(), 0.0, 139.0);
        let b = DedupKey::new(SourceTag::Usgs, noon(), -0.0, 139.0);
        assert_eq!(a, b);
        let c = DedupKey::new(SourceTag::Geofon, noon(), 0.0, 139.0);
        assert_ne!(a, c);
    }
}
