//! Property tests for row accounting and merge idempotence.

use proptest::prelude::{Just, Strategy, prop, prop_assert, prop_assert_eq, prop_oneof, proptest};

use quake_map::MappingProfile;
use quake_model::RawTable;
use quake_transform::{NormalizeOptions, Normalizer, merge_tables};

fn cell_strategy(valid: impl Strategy<Value = String> + 'static) -> impl Strategy<Value = String> {
    prop_oneof![
        6 => valid,
        1 => Just(String::new()),
        1 => Just("n/a".to_string()),
        1 => "[a-z]{1,6}",
    ]
}

fn time_cell() -> impl Strategy<Value = String> {
    cell_strategy((1u32..=28, 0u32..24).prop_map(|(day, hour)| format!("2025-10-{day:02}T{hour:02}:00:00Z")))
}

fn coordinate_cell(range: std::ops::Range<f64>) -> impl Strategy<Value = String> {
    // One decimal keeps collisions likely enough to exercise dedup.
    cell_strategy(range.prop_map(|value| format!("{value:.1}")))
}

fn raw_table() -> impl Strategy<Value = RawTable> {
    prop::collection::vec(
        (
            time_cell(),
            coordinate_cell(34.0..36.0),
            coordinate_cell(138.0..140.0),
            cell_strategy((0.0f64..8.0).prop_map(|mag| format!("{mag:.1}"))),
        ),
        0..40,
    )
    .prop_map(|rows| {
        let mut table = RawTable::new(
            ["time", "lat", "lon", "mag"]
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        );
        for (time, lat, lon, mag) in rows {
            table.push_row(vec![time, lat, lon, mag]);
        }
        table
    })
}

proptest! {
    #[test]
    fn batch_counts_balance(table in raw_table()) {
        let profile = MappingProfile::default();
        let batch = Normalizer::new(&profile, NormalizeOptions::default())
            .normalize(&table, "JAPAN_USGS.csv");
        prop_assert_eq!(batch.summary.rows_read, table.height());
        prop_assert!(batch.summary.is_balanced());
        prop_assert_eq!(batch.summary.rows_out, batch.table.height());
    }

    #[test]
    fn numeric_fields_are_finite_with_derivation(table in raw_table()) {
        let profile = MappingProfile::default();
        let options = NormalizeOptions { derive_missing_distance: true };
        let batch = Normalizer::new(&profile, options).normalize(&table, "JAPAN_USGS.csv");
        for row in &batch.table.rows {
            if row.magnitude.is_some() {
                prop_assert!(row.latitude.is_some_and(f64::is_finite));
                prop_assert!(row.longitude.is_some_and(f64::is_finite));
                prop_assert!(row.dist_to_tokyo.is_some_and(f64::is_finite));
            }
        }
    }

    #[test]
    fn merge_with_itself_is_identity(table in raw_table()) {
        let profile = MappingProfile::default();
        let batch = Normalizer::new(&profile, NormalizeOptions::default())
            .normalize(&table, "JAPAN_USGS.csv");
        let once = merge_tables(std::slice::from_ref(&batch.table));
        let twice = merge_tables(&[batch.table.clone(), batch.table.clone()]);
        prop_assert_eq!(&once.records, &twice.records);
        prop_assert_eq!(once.to_table(batch.table.label.clone()), batch.table);
        prop_assert!(twice.summary.is_balanced());
    }
}
