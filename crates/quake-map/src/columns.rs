//! Column Mapper: source column spellings to canonical columns.

use std::collections::BTreeMap;
use std::path::Path;

use quake_model::CanonicalColumn;

use crate::error::{MappingError, Result};

/// Every column spelling observed across the USGS API export, the EMSC list
/// scrape and the GEOFON list scrape, plus earlier cleaned datasets.
const BUILTIN_COLUMNS: &[(&str, CanonicalColumn)] = &[
    // time
    ("time", CanonicalColumn::Time),
    ("Datetime", CanonicalColumn::Time),
    ("date_time_UTC", CanonicalColumn::Time),
    ("DateTime_UTC", CanonicalColumn::Time),
    ("time_utc", CanonicalColumn::Time),
    // month
    ("month", CanonicalColumn::Month),
    ("Month", CanonicalColumn::Month),
    // latitude
    ("latitude", CanonicalColumn::Latitude),
    ("Latitude", CanonicalColumn::Latitude),
    ("latitude_deg", CanonicalColumn::Latitude),
    ("lat", CanonicalColumn::Latitude),
    // longitude
    ("longitude", CanonicalColumn::Longitude),
    ("Longitude", CanonicalColumn::Longitude),
    ("longitude_deg", CanonicalColumn::Longitude),
    ("lon", CanonicalColumn::Longitude),
    // depth
    ("depth", CanonicalColumn::Depth),
    ("Depth", CanonicalColumn::Depth),
    ("depth_km", CanonicalColumn::Depth),
    ("Depth_km", CanonicalColumn::Depth),
    // magnitude
    ("magnitude", CanonicalColumn::Magnitude),
    ("Magnitude", CanonicalColumn::Magnitude),
    ("magnitude_value", CanonicalColumn::Magnitude),
    ("mag", CanonicalColumn::Magnitude),
    // region; USGS calls its location label `place`
    ("region", CanonicalColumn::Region),
    ("Region", CanonicalColumn::Region),
    ("place", CanonicalColumn::Region),
    ("Place", CanonicalColumn::Region),
    // category; USGS event `type` (earthquake, quarry blast, ...)
    ("category", CanonicalColumn::Category),
    ("Category", CanonicalColumn::Category),
    ("type", CanonicalColumn::Category),
    // distance to Tokyo
    ("dist_to_Tokyo", CanonicalColumn::DistToTokyo),
    ("dist_to_Tokyo_km", CanonicalColumn::DistToTokyo),
    ("Dist_to_Tokyo_km", CanonicalColumn::DistToTokyo),
    ("dist_to_tokyo_km", CanonicalColumn::DistToTokyo),
    // source
    ("source", CanonicalColumn::Source),
    ("Data_source", CanonicalColumn::Source),
    ("data_source", CanonicalColumn::Source),
];

fn fold(name: &str) -> String {
    name.trim().trim_matches('\u{feff}').to_lowercase()
}

/// Many-to-one table from source column names to canonical columns.
///
/// Lookups ignore case and surrounding whitespace. The map is plain data:
/// build it once and pass it by reference into normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    entries: BTreeMap<String, CanonicalColumn>,
}

impl ColumnMap {
    /// An empty map. Canonical names still resolve through [`ColumnMap::resolve`].
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in catalog covering all known source formats.
    #[must_use]
    pub fn builtin() -> Self {
        let mut map = Self::empty();
        for (name, column) in BUILTIN_COLUMNS {
            map.insert(name, *column);
        }
        map
    }

    /// Adds or replaces a mapping, returning the previous target.
    pub fn insert(&mut self, name: &str, column: CanonicalColumn) -> Option<CanonicalColumn> {
        self.entries.insert(fold(name), column)
    }

    /// Mapped canonical column for an explicitly listed source name.
    #[must_use]
    pub fn canonical_for(&self, name: &str) -> Option<CanonicalColumn> {
        self.entries.get(&fold(name)).copied()
    }

    /// Mapped column, falling back to names that already are canonical.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<CanonicalColumn> {
        self.canonical_for(name)
            .or_else(|| CanonicalColumn::from_name(name))
    }

    /// Layers `overrides` on top of this map; overrides win on conflicts.
    #[must_use]
    pub fn merged_with(mut self, overrides: &ColumnMap) -> Self {
        for (name, column) in &overrides.entries {
            self.entries.insert(name.clone(), *column);
        }
        self
    }

    /// Parses a JSON object of `{"source column": "canonical name"}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        let mut map = Self::empty();
        for (name, target) in raw {
            let column =
                CanonicalColumn::from_name(&target).ok_or_else(|| MappingError::UnknownTarget {
                    column: name.clone(),
                    target: target.clone(),
                })?;
            map.insert(&name, column);
        }
        Ok(map)
    }

    /// Reads a JSON override file (see [`ColumnMap::from_json_str`]).
    pub fn load_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| MappingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folded source names and their targets, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, CanonicalColumn)> {
        self.entries
            .iter()
            .map(|(name, column)| (name.as_str(), *column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_source_spellings() {
        let map = ColumnMap::builtin();
        for name in ["DateTime_UTC", "date_time_UTC", "Datetime", "time_utc", "TIME"] {
            assert_eq!(map.canonical_for(name), Some(CanonicalColumn::Time), "{name}");
        }
        assert_eq!(map.canonical_for("Depth_km"), Some(CanonicalColumn::Depth));
        assert_eq!(map.canonical_for(" lat "), Some(CanonicalColumn::Latitude));
        assert_eq!(map.canonical_for("magnitude_type"), None);
        assert_eq!(map.canonical_for("Event_ID"), None);
    }

    #[test]
    fn every_canonical_name_maps_to_itself() {
        let map = ColumnMap::builtin();
        for column in CanonicalColumn::ALL {
            assert_eq!(map.canonical_for(column.name()), Some(column));
        }
    }

    #[test]
    fn empty_map_still_resolves_canonical_names() {
        let map = ColumnMap::empty();
        assert_eq!(map.canonical_for("latitude"), None);
        assert_eq!(map.resolve("latitude"), Some(CanonicalColumn::Latitude));
        assert_eq!(map.resolve("lat"), None);
    }

    #[test]
    fn overrides_win() {
        let overrides = ColumnMap::from_json_str(r#"{"place": "category", "Epicenter": "region"}"#)
            .expect("valid overrides");
        let map = ColumnMap::builtin().merged_with(&overrides);
        assert_eq!(map.canonical_for("place"), Some(CanonicalColumn::Category));
        assert_eq!(map.canonical_for("epicenter"), Some(CanonicalColumn::Region));
        assert_eq!(map.canonical_for("mag"), Some(CanonicalColumn::Magnitude));
    }

    #[test]
    fn rejects_unknown_targets() {
        let err = ColumnMap::from_json_str(r#"{"mag_type": "magnitude_scale"}"#).unwrap_err();
        assert!(matches!(err, MappingError::UnknownTarget { .. }));
        assert!(ColumnMap::from_json_str("[1, 2]").is_err());
    }
}
