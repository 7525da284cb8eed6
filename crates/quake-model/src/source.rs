//! Provenance tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Upstream catalog that produced a record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceTag {
    Usgs,
    Geofon,
    Emsc,
    Api,
    #[default]
    Unknown,
}

impl SourceTag {
    pub const ALL: [SourceTag; 5] = [
        SourceTag::Usgs,
        SourceTag::Geofon,
        SourceTag::Emsc,
        SourceTag::Api,
        SourceTag::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usgs => "USGS",
            Self::Geofon => "GEOFON",
            Self::Emsc => "EMSC",
            Self::Api => "API",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = ModelError;

    /// Exact tag names only, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::UnknownSource {
                label: trimmed.to_string(),
            })
    }
}
