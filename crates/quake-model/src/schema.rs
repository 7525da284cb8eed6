//! Canonical earthquake schema.
//!
//! Every stage of the pipeline (normalization, merge, store DDL, export)
//! consults this declaration instead of checking column presence ad hoc.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// How a canonical field is typed once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Provenance tag (`SourceTag`).
    Provenance,
    /// UTC timestamp without an attached zone.
    Timestamp,
    /// Floating-point number.
    Numeric,
    /// Free text passed through as-is.
    Text,
}

/// A column of the canonical earthquake table.
///
/// Variants are declared in persisted column order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CanonicalColumn {
    Source,
    Time,
    Month,
    Category,
    Latitude,
    Longitude,
    Depth,
    Magnitude,
    Region,
    DistToTokyo,
}

impl CanonicalColumn {
    /// All canonical columns in persisted order.
    pub const ALL: [CanonicalColumn; 10] = [
        CanonicalColumn::Source,
        CanonicalColumn::Time,
        CanonicalColumn::Month,
        CanonicalColumn::Category,
        CanonicalColumn::Latitude,
        CanonicalColumn::Longitude,
        CanonicalColumn::Depth,
        CanonicalColumn::Magnitude,
        CanonicalColumn::Region,
        CanonicalColumn::DistToTokyo,
    ];

    /// Columns that must be non-null on every persisted record.
    pub const REQUIRED: [CanonicalColumn; 4] = [
        CanonicalColumn::Source,
        CanonicalColumn::Time,
        CanonicalColumn::Latitude,
        CanonicalColumn::Longitude,
    ];

    /// Columns forming the duplicate-observation key.
    pub const DEDUP_KEY: [CanonicalColumn; 4] = Self::REQUIRED;

    /// Numeric columns coerced during normalization.
    pub const NUMERIC: [CanonicalColumn; 5] = [
        CanonicalColumn::Latitude,
        CanonicalColumn::Longitude,
        CanonicalColumn::Depth,
        CanonicalColumn::Magnitude,
        CanonicalColumn::DistToTokyo,
    ];

    /// Persisted column name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Time => "time",
            Self::Month => "month",
            Self::Category => "category",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Depth => "depth",
            Self::Magnitude => "magnitude",
            Self::Region => "region",
            Self::DistToTokyo => "dist_to_Tokyo",
        }
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Source => FieldKind::Provenance,
            Self::Time => FieldKind::Timestamp,
            Self::Latitude | Self::Longitude | Self::Depth | Self::Magnitude | Self::DistToTokyo => {
                FieldKind::Numeric
            }
            Self::Month | Self::Category | Self::Region => FieldKind::Text,
        }
    }

    #[must_use]
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    /// Position of the column in persisted order.
    #[must_use]
    pub fn position(self) -> usize {
        self as usize
    }

    /// Looks up a column by its persisted name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        Self::ALL
            .into_iter()
            .find(|column| column.name().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for CanonicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CanonicalColumn {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ModelError::UnknownColumn {
            name: s.to_string(),
        })
    }
}

/// Persisted column names in canonical order.
#[must_use]
pub fn canonical_names() -> Vec<&'static str> {
    CanonicalColumn::ALL.iter().map(|column| column.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_order_matches_declaration() {
        assert_eq!(
            canonical_names(),
            vec![
                "source",
                "time",
                "month",
                "category",
                "latitude",
                "longitude",
                "depth",
                "magnitude",
                "region",
                "dist_to_Tokyo",
            ]
        );
        for (idx, column) in CanonicalColumn::ALL.iter().enumerate() {
            assert_eq!(column.position(), idx);
        }
    }

    #[test]
    fn required_columns() {
        let required: Vec<_> = CanonicalColumn::ALL
            .into_iter()
            .filter(|column| column.is_required())
            .collect();
        assert_eq!(required, CanonicalColumn::REQUIRED.to_vec());
        assert!(!CanonicalColumn::Month.is_required());
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(
            "DIST_TO_TOKYO".parse::<CanonicalColumn>().unwrap(),
            CanonicalColumn::DistToTokyo
        );
        assert!("place".parse::<CanonicalColumn>().is_err());
    }
}
