use std::fs;

use quake_map::{ColumnMap, MappingError, MappingProfile};
use quake_model::CanonicalColumn;

#[test]
fn loads_overrides_from_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("columns.json");
    fs::write(&path, r#"{"Epicentre": "region", "Hypo_depth": "depth"}"#).expect("write");

    let overrides = ColumnMap::load_json(&path).expect("load overrides");
    assert_eq!(overrides.len(), 2);

    let profile = MappingProfile::default().with_column_overrides(&overrides);
    assert_eq!(
        profile.columns.canonical_for("EPICENTRE"),
        Some(CanonicalColumn::Region)
    );
    assert_eq!(
        profile.columns.canonical_for("hypo_depth"),
        Some(CanonicalColumn::Depth)
    );
    assert_eq!(
        profile.columns.canonical_for("latitude_deg"),
        Some(CanonicalColumn::Latitude)
    );
}

#[test]
fn missing_override_file_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.json");
    let err = ColumnMap::load_json(&path).unwrap_err();
    assert!(matches!(err, MappingError::Read { .. }));
    assert!(err.to_string().contains("absent.json"));
}
