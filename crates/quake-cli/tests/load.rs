//! End-to-end load pipeline runs against temporary databases.

use std::fs;
use std::path::{Path, PathBuf};

use quake_cli::pipeline::{LoadOptions, QueryPaths, load_profile, run_load};
use quake_cli::types::{FileOutcome, QueryRun};
use quake_model::{CanonicalColumn, IssueKind, SourceTag};
use quake_store::{DEFAULT_TABLE, EarthquakeStore, QueryOutcome};

const USGS_CSV: &str = "\
time,latitude,longitude,depth,mag,place,type
2025-10-01T00:00:00.000Z,35.0,139.0,10.5,5.2,\"10 km E of Tokyo, Japan\",earthquake
2025-10-02T03:04:05.000Z,36.0,140.0,20,4.1,Honshu,earthquake
2025-10-02T03:04:05.000Z,36.0,140.0,20,4.1,Honshu,earthquake
,37.0,141.0,5,3.0,Honshu,earthquake
";

const EMSC_CSV: &str = "\
date_time_UTC,latitude_deg,longitude_deg,depth_km,magnitude_value,region
2025-10-03 12:00:00,34.5,138.2,30,abc,NEAR EAST COAST OF HONSHU
";

fn workspace() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let inputs = dir.path().join("df");
    fs::create_dir_all(&inputs).expect("create input dir");
    fs::write(inputs.join("JAPAN_USGS.csv"), USGS_CSV).expect("write usgs");
    fs::write(inputs.join("JAPAN_EMSC.csv"), EMSC_CSV).expect("write emsc");
    (dir, inputs)
}

fn options(root: &Path, inputs: &Path) -> LoadOptions {
    LoadOptions {
        inputs: Vec::new(),
        dir: inputs.to_path_buf(),
        pattern: "*.csv".to_string(),
        recursive: false,
        db: root.join("earthquakes.db"),
        table: DEFAULT_TABLE.to_string(),
        column_map: None,
        derive_distance: false,
        export_path: Some(root.join("outputs/earthquakes_export.csv")),
        queries: None,
        dry_run: false,
    }
}

fn read_without_bom(path: &Path) -> String {
    fs::read_to_string(path)
        .expect("read output")
        .trim_start_matches('\u{feff}')
        .to_string()
}

#[test]
fn loads_directory_and_counts_every_row() {
    let (dir, inputs) = workspace();
    let result = run_load(&options(dir.path(), &inputs)).expect("load");

    assert!(!result.has_errors, "{:?}", result.errors);
    assert_eq!(result.files.len(), 2);
    let usgs = result
        .files
        .iter()
        .find(|file| file.source == SourceTag::Usgs)
        .expect("usgs file");
    let FileOutcome::Normalized(summary) = &usgs.outcome else {
        panic!("usgs file failed");
    };
    assert_eq!(summary.rows_read, 4);
    assert_eq!(summary.dropped_missing_required, 1);
    assert_eq!(summary.removed_duplicate, 1);
    assert_eq!(summary.rows_out, 2);

    assert_eq!(result.merge.tables, 2);
    assert_eq!(result.merge.rows_in, 3);
    assert_eq!(result.merge.rows_out, 3);
    let insert = result.insert.expect("insert ran");
    assert_eq!(insert.inserted, 3);
    assert_eq!(insert.skipped_existing, 0);

    let export = result.export.expect("export ran");
    assert_eq!(export.rows, 3);
    let text = read_without_bom(&export.path);
    assert_eq!(text.lines().count(), 4);
    assert!(text.contains("\"10 km E of Tokyo, Japan\""));
}

#[test]
fn unparseable_values_are_reported_not_fatal() {
    let (dir, inputs) = workspace();
    let result = run_load(&options(dir.path(), &inputs)).expect("load");
    let emsc = result
        .files
        .iter()
        .find(|file| file.source == SourceTag::Emsc)
        .expect("emsc file");
    let FileOutcome::Normalized(summary) = &emsc.outcome else {
        panic!("emsc file failed");
    };
    assert_eq!(summary.rows_out, 1);
    assert_eq!(summary.issues.len(), 1);
    assert_eq!(summary.issues[0].column, CanonicalColumn::Magnitude);
    assert_eq!(summary.issues[0].kind, IssueKind::Unparseable);
    assert_eq!(summary.issues[0].examples, vec!["abc".to_string()]);
}

#[test]
fn second_load_skips_stored_rows() {
    let (dir, inputs) = workspace();
    let options = options(dir.path(), &inputs);
    run_load(&options).expect("first load");
    let second = run_load(&options).expect("second load");

    let insert = second.insert.expect("insert ran");
    assert_eq!(insert.attempted, 3);
    assert_eq!(insert.inserted, 0);
    assert_eq!(insert.skipped_existing, 3);

    for file in &second.files {
        let insert = file.insert.expect("per-file insert");
        assert_eq!(insert.inserted, 0);
        assert_eq!(insert.skipped_existing, insert.attempted);
    }

    let store = EarthquakeStore::open(&options.db).expect("open");
    assert_eq!(store.count(DEFAULT_TABLE).expect("count"), 3);
}

#[test]
fn inserted_rows_are_reported_per_file() {
    let (dir, inputs) = workspace();
    fs::write(
        inputs.join("JAPAN_USGS_2.csv"),
        "time,latitude,longitude,mag\n2025-10-01T00:00:00.000Z,35.0,139.0,5.2\n",
    )
    .expect("write copy");
    let result = run_load(&options(dir.path(), &inputs)).expect("load");

    let inserted: Vec<(String, usize)> = result
        .files
        .iter()
        .map(|file| {
            let name = file
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            (name, file.insert.expect("per-file insert").inserted)
        })
        .collect();
    assert_eq!(
        inserted,
        vec![
            ("JAPAN_EMSC.csv".to_string(), 1),
            ("JAPAN_USGS.csv".to_string(), 2),
            ("JAPAN_USGS_2.csv".to_string(), 0),
        ]
    );
    assert_eq!(result.merge.removed_duplicate, 1);
    assert_eq!(result.insert.expect("insert ran").inserted, 3);
}

#[test]
fn empty_cell_rows_are_counted_and_dropped() {
    let dir = tempfile::tempdir().expect("temp dir");
    let inputs = dir.path().join("df");
    fs::create_dir_all(&inputs).expect("create input dir");
    fs::write(
        inputs.join("JAPAN_USGS.csv"),
        "time,latitude,longitude,mag\n,,,\n\n2025-10-01T00:00:00.000Z,35.0,139.0,5.2\n",
    )
    .expect("write usgs");
    let result = run_load(&options(dir.path(), &inputs)).expect("load");

    let FileOutcome::Normalized(summary) = &result.files[0].outcome else {
        panic!("usgs file failed");
    };
    assert_eq!(summary.rows_read, 2);
    assert_eq!(summary.dropped_missing_required, 1);
    assert_eq!(summary.rows_out, 1);
}

#[test]
fn over_wide_file_fails_alone() {
    let (dir, inputs) = workspace();
    fs::write(
        inputs.join("JAPAN_GEOFON.csv"),
        "time,latitude,longitude\n2025-10-04T00:00:00Z,33.0,131.0,EXTRA\n",
    )
    .expect("write geofon");
    let result = run_load(&options(dir.path(), &inputs)).expect("load");

    assert_eq!(result.failed_files(), 1);
    let geofon = result
        .files
        .iter()
        .find(|file| file.source == SourceTag::Geofon)
        .expect("geofon file");
    assert!(matches!(geofon.outcome, FileOutcome::Failed(_)));
    assert!(geofon.insert.is_none());
    assert_eq!(result.insert.expect("insert ran").inserted, 3);
}

#[test]
fn failing_file_is_isolated() {
    let (dir, inputs) = workspace();
    fs::write(inputs.join("broken.csv"), "").expect("write empty file");
    let result = run_load(&options(dir.path(), &inputs)).expect("load");

    assert!(result.has_errors);
    assert_eq!(result.failed_files(), 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("broken.csv"));
    assert_eq!(result.insert.expect("insert ran").inserted, 3);
}

#[test]
fn dry_run_writes_nothing() {
    let (dir, inputs) = workspace();
    let options = LoadOptions {
        dry_run: true,
        ..options(dir.path(), &inputs)
    };
    let result = run_load(&options).expect("load");

    assert_eq!(result.merge.rows_out, 3);
    assert!(result.insert.is_none());
    assert!(result.export.is_none());
    assert!(!options.db.exists());
    assert!(!dir.path().join("outputs").exists());
}

#[test]
fn explicit_inputs_and_distance_derivation() {
    let (dir, inputs) = workspace();
    let options = LoadOptions {
        inputs: vec![inputs.join("JAPAN_USGS.csv")],
        derive_distance: true,
        export_path: None,
        ..options(dir.path(), &inputs)
    };
    let result = run_load(&options).expect("load");
    assert_eq!(result.files.len(), 1);
    assert!(result.export.is_none());

    let store = EarthquakeStore::open(&options.db).expect("open");
    let records = store.load_records(DEFAULT_TABLE).expect("load records");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.dist_to_tokyo.is_some()));
}

#[test]
fn named_queries_run_after_insert() {
    let (dir, inputs) = workspace();
    let queries = dir.path().join("queries.sql");
    fs::write(
        &queries,
        "-- name: by_source\n\
         SELECT source, COUNT(*) AS n FROM earthquakes GROUP BY source ORDER BY source;\n\
         -- name: wipe\n\
         DELETE FROM earthquakes;\n",
    )
    .expect("write queries");
    let out_dir = dir.path().join("outputs/queries");
    let options = LoadOptions {
        queries: Some(QueryPaths {
            file: queries,
            out_dir: out_dir.clone(),
        }),
        ..options(dir.path(), &inputs)
    };
    let result = run_load(&options).expect("load");

    let Some(QueryRun::Ran(outcomes)) = &result.queries else {
        panic!("queries did not run");
    };
    assert!(matches!(&outcomes[0], QueryOutcome::Written { rows: 2, .. }));
    assert!(matches!(&outcomes[1], QueryOutcome::Skipped { .. }));
    assert_eq!(
        read_without_bom(&out_dir.join("by_source.csv")),
        "source,n\nEMSC,1\nUSGS,2\n"
    );
    assert_eq!(result.export.expect("export ran").rows, 3);
}

#[test]
fn missing_query_file_is_skipped() {
    let (dir, inputs) = workspace();
    let missing = dir.path().join("nope.sql");
    let options = LoadOptions {
        queries: Some(QueryPaths {
            file: missing.clone(),
            out_dir: dir.path().join("outputs/queries"),
        }),
        ..options(dir.path(), &inputs)
    };
    let result = run_load(&options).expect("load");
    assert_eq!(result.queries, Some(QueryRun::MissingFile(missing)));
    assert!(!result.has_errors);
}

#[test]
fn column_map_overrides_extend_builtin_names() {
    let dir = tempfile::tempdir().expect("temp dir");
    let map = dir.path().join("columns.json");
    fs::write(&map, r#"{"Mag (Mw)": "magnitude"}"#).expect("write map");
    let profile = load_profile(Some(&map)).expect("profile");
    assert_eq!(
        profile.columns.resolve("mag (mw)"),
        Some(CanonicalColumn::Magnitude)
    );
    assert_eq!(profile.columns.resolve("mag"), Some(CanonicalColumn::Magnitude));

    fs::write(&map, r#"{"Mag (Mw)": "moment"}"#).expect("write map");
    assert!(load_profile(Some(&map)).is_err());
}
