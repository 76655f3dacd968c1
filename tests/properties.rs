//! Property-based tests for the profiling invariants.
//!
//! Random grids are rendered to CSV (every field quoted, so embedded
//! delimiters, quotes and newlines are exercised) and pushed through the
//! whole pipeline.

use proptest::prelude::*;
use u_profile::dataset::ColumnType;
use u_profile::detect::detect_primary_keys;
use u_profile::parse_dataset;
use u_profile::statistics::{
    analyze_column, frequency_table, numeric_summary, AnalysisConfig, VarianceKind,
};

// Strategy: a raw cell (number, word, blank or awkward text)
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        (-1.0e6f64..1.0e6).prop_map(|v| v.to_string()),
        (-1000i64..1000).prop_map(|v| v.to_string()),
        "[a-z]{1,6}",
        Just(String::new()),
        "[a-z ,\"\n]{1,8}",
    ]
}

// Strategy: rectangular grid with at least two columns
fn grid() -> impl Strategy<Value = Vec<Vec<String>>> {
    (2usize..5, 1usize..30).prop_flat_map(|(cols, rows)| {
        prop::collection::vec(prop::collection::vec(cell(), cols), rows)
    })
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn to_csv(grid: &[Vec<String>]) -> String {
    let width = grid[0].len();
    let header: Vec<String> = (0..width).map(|i| format!("c{i}")).collect();
    let mut csv = header.join(",");
    csv.push('\n');
    for row in grid {
        let fields: Vec<String> = row.iter().map(|f| quote(f)).collect();
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }
    csv
}

proptest! {
    #[test]
    fn built_dataset_matches_parsed_shape(grid in grid()) {
        let ds = parse_dataset("grid.csv", &to_csv(&grid)).unwrap();
        prop_assert_eq!(ds.row_count(), grid.len());
        prop_assert_eq!(ds.column_count(), grid[0].len());
        prop_assert!(ds.rows().iter().all(|r| r.len() == ds.column_count()));

        for col in ds.columns() {
            let non_missing = ds
                .column_values(&col.key)
                .unwrap()
                .filter(|c| !c.is_missing())
                .count();
            prop_assert_eq!(col.missing_count + non_missing, ds.row_count());
            prop_assert!(col.unique_values <= non_missing);
        }
    }

    #[test]
    fn numeric_summary_invariants(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..300)) {
        let s = numeric_summary(&values, &AnalysisConfig::default());
        prop_assert_eq!(s.count, values.len());
        prop_assert!(s.min <= s.q1 && s.q1 <= s.median && s.median <= s.q3 && s.q3 <= s.max);
        prop_assert!(s.variance >= 0.0);
        prop_assert!((s.stdev - s.variance.sqrt()).abs() <= 1e-12 * s.stdev.max(1.0));
        prop_assert!((s.sum / s.count as f64 - s.mean).abs() <= 1e-9 * s.mean.abs().max(1.0));

        let bins = &s.histogram;
        prop_assert!(!bins.is_empty() && bins.len() <= 20);
        prop_assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), s.count);
        prop_assert!(bins.iter().all(|b| b.x0 < b.x1));
        for pair in bins.windows(2) {
            prop_assert_eq!(pair[0].x1, pair[1].x0);
        }
        prop_assert!(bins[0].x0 <= s.min);
        prop_assert!(bins[bins.len() - 1].x1 >= s.max);
    }

    #[test]
    fn sample_variance_not_below_population(values in prop::collection::vec(-1.0e3f64..1.0e3, 2..100)) {
        let pop = numeric_summary(&values, &AnalysisConfig::default());
        let sample = numeric_summary(
            &values,
            &AnalysisConfig { variance: VarianceKind::Sample, ..AnalysisConfig::default() },
        );
        prop_assert!(sample.variance >= pop.variance);
    }

    #[test]
    fn frequency_table_accounts_for_every_value(
        words in prop::collection::vec(prop_oneof!["[a-e]{1,2}", Just(String::new())], 1..120)
    ) {
        let mut csv = String::from("id,w\n");
        for (i, w) in words.iter().enumerate() {
            csv.push_str(&format!("{i},{w}\n"));
        }
        let ds = parse_dataset("words.csv", &csv).unwrap();
        let non_missing = words.iter().filter(|w| !w.is_empty()).count();

        let table = frequency_table(&ds, "w").unwrap();
        prop_assert_eq!(table.iter().map(|i| i.count).sum::<usize>(), non_missing);
        prop_assert!(table.windows(2).all(|p| p[0].count >= p[1].count));
        if non_missing > 0 {
            let pct: f64 = table.iter().map(|i| i.percentage).sum();
            prop_assert!((pct - 100.0).abs() < 1e-6);
        }

        let analysis = analyze_column(&ds, "w").unwrap();
        prop_assert_eq!(analysis.column.column_type, ColumnType::Categorical);
        let summary = analysis.categorical().unwrap();
        prop_assert_eq!(summary.total, non_missing);
        prop_assert!(summary.items.len() <= 10);
        prop_assert_eq!(&summary.items[..], &table[..summary.items.len()]);
    }

    #[test]
    fn primary_keys_follow_uniqueness(values in prop::collection::vec(0u32..40, 1..50)) {
        let mut csv = String::from("row,v\n");
        for (i, v) in values.iter().enumerate() {
            csv.push_str(&format!("{i},{v}\n"));
        }
        let ds = parse_dataset("keys.csv", &csv).unwrap();
        let keys = detect_primary_keys(&ds);

        let mut distinct = values.clone();
        distinct.sort_unstable();
        distinct.dedup();

        prop_assert!(keys.contains(&"row".to_string()));
        prop_assert_eq!(keys.contains(&"v".to_string()), distinct.len() == values.len());
    }

    #[test]
    fn analysis_is_idempotent(grid in grid()) {
        let ds = parse_dataset("grid.csv", &to_csv(&grid)).unwrap();
        for col in ds.columns() {
            let first = analyze_column(&ds, &col.key).unwrap();
            let second = analyze_column(&ds, &col.key).unwrap();
            // NaN sentinels only appear for empty numeric summaries, which never occur here
            prop_assert_eq!(first, second);
        }
    }
}
