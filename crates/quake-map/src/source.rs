//! Source Inferencer: provenance tags from file or batch names.

use std::path::Path;

use quake_model::SourceTag;

/// Ordered tokens; the first token contained in the hint wins.
const BUILTIN_TOKENS: &[(&str, SourceTag)] = &[
    ("usgs", SourceTag::Usgs),
    ("geofon", SourceTag::Geofon),
    ("emsc", SourceTag::Emsc),
    ("api", SourceTag::Api),
    ("dataset", SourceTag::Api),
];

/// Derives a provenance tag by case-insensitive substring match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInferencer {
    tokens: Vec<(String, SourceTag)>,
}

impl Default for SourceInferencer {
    fn default() -> Self {
        Self::new(
            BUILTIN_TOKENS
                .iter()
                .map(|(token, tag)| ((*token).to_string(), *tag)),
        )
    }
}

impl SourceInferencer {
    /// Builds an inferencer from ordered `(token, tag)` pairs.
    pub fn new(tokens: impl IntoIterator<Item = (String, SourceTag)>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(token, tag)| (token.to_lowercase(), tag))
                .filter(|(token, _)| !token.is_empty())
                .collect(),
        }
    }

    /// Tag for a file or batch identifier. Never fails; `UNKNOWN` when no token matches.
    #[must_use]
    pub fn infer(&self, hint: &str) -> SourceTag {
        self.match_token(hint).unwrap_or(SourceTag::Unknown)
    }

    /// Tag for a file path, matched against the file stem only.
    #[must_use]
    pub fn infer_from_path(&self, path: &Path) -> SourceTag {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        self.infer(stem)
    }

    /// Interprets a provenance label found in the data.
    ///
    /// Exact tag names win, then the token rules. `None` means the label is
    /// not recognizable.
    #[must_use]
    pub fn resolve_label(&self, label: &str) -> Option<SourceTag> {
        label
            .parse::<SourceTag>()
            .ok()
            .or_else(|| self.match_token(label))
    }

    fn match_token(&self, hint: &str) -> Option<SourceTag> {
        let lowered = hint.to_lowercase();
        self.tokens
            .iter()
            .find(|(token, _)| lowered.contains(token.as_str()))
            .map(|(_, tag)| *tag)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn infers_from_known_file_names() {
        let inferencer = SourceInferencer::default();
        assert_eq!(inferencer.infer("JAPAN_USGS"), SourceTag::Usgs);
        assert_eq!(inferencer.infer("japan_geofon"), SourceTag::Geofon);
        assert_eq!(inferencer.infer("JAPAN_EMSC"), SourceTag::Emsc);
        assert_eq!(inferencer.infer("JAPAN_API_cleaned"), SourceTag::Api);
        assert_eq!(inferencer.infer("clean_dataset"), SourceTag::Api);
        assert_eq!(inferencer.infer("notes"), SourceTag::Unknown);
        assert_eq!(inferencer.infer(""), SourceTag::Unknown);
    }

    #[test]
    fn token_order_decides_ties() {
        let inferencer = SourceInferencer::default();
        assert_eq!(inferencer.infer("usgs_vs_emsc"), SourceTag::Usgs);
        assert_eq!(inferencer.infer("emsc_api_dump"), SourceTag::Emsc);
    }

    #[test]
    fn path_inference_uses_stem() {
        let inferencer = SourceInferencer::default();
        let path = PathBuf::from("/data/api_exports/japan_GEOFON.csv");
        assert_eq!(inferencer.infer_from_path(&path), SourceTag::Geofon);
        let no_stem = PathBuf::from("/");
        assert_eq!(inferencer.infer_from_path(&no_stem), SourceTag::Unknown);
    }

    #[test]
    fn resolves_labels() {
        let inferencer = SourceInferencer::default();
        assert_eq!(inferencer.resolve_label("unknown"), Some(SourceTag::Unknown));
        assert_eq!(inferencer.resolve_label("USGS ComCat"), Some(SourceTag::Usgs));
        assert_eq!(inferencer.resolve_label("JMA"), None);
    }

    #[test]
    fn custom_tokens() {
        let inferencer = SourceInferencer::new([("JMA".to_string(), SourceTag::Api)]);
        assert_eq!(inferencer.infer("jma_bulletin"), SourceTag::Api);
        assert_eq!(inferencer.infer("usgs"), SourceTag::Unknown);
    }
}
