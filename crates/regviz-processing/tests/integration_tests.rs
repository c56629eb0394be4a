//! Integration tests for loading, validating, cleaning and profiling tables.
//!
//! These tests run the same sequence a regression request runs, on a small
//! CSV fixture with messy column names and missing values.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use regviz_processing::utils::{numeric_values, string_values};
use regviz_processing::{
    DataCleaner, DataProfiler, ErrorKind, NullStrategy, ProcessingError, Sanitize,
    detect_feature_types, load_csv, normalize_column_names, parse_feature_list,
    validate_selection,
};
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_houses() -> DataFrame {
    let df = load_csv(fixtures_path().join("houses.csv")).expect("Failed to read fixture");
    normalize_column_names(df).expect("Fixture column names are unique")
}

// ============================================================================
// Request Flow
// ============================================================================

#[test]
fn test_fixture_names_are_trimmed() {
    let df = load_houses();
    assert!(df.column("age").is_ok());
    assert_eq!(df.height(), 8);
}

#[test]
fn test_mean_strategy_fills_age_with_present_mean() {
    let df = load_houses();
    let features = parse_feature_list("age, city");
    let selection = validate_selection(&df, "price", &features).unwrap();

    let (cleaned, report) = DataCleaner::new(NullStrategy::Mean)
        .clean(&df, &selection.features, &selection.target)
        .unwrap();

    assert_eq!(cleaned.height(), 8);
    assert_eq!(report.rows_before, report.rows_after);

    let expected_mean = (25.0 + 32.0 + 41.0 + 38.0 + 29.0 + 52.0 + 45.0) / 7.0;
    let age = numeric_values(cleaned.column("age").unwrap().as_materialized_series()).unwrap();
    assert!((age[2].unwrap() - expected_mean).abs() < 1e-9);
    assert!(age.iter().all(Option::is_some));

    let city = string_values(cleaned.column("city").unwrap().as_materialized_series()).unwrap();
    assert_eq!(city[4].as_deref(), Some("Paris"));
}

#[test]
fn test_drop_strategy_counts_complete_rows() {
    let df = load_houses();
    let (cleaned, report) = DataCleaner::new(NullStrategy::Drop)
        .clean(&df, &["age", "city"], "price")
        .unwrap();

    assert_eq!(cleaned.height(), 6);
    assert_eq!(report.rows_removed(), 2);
    for column in cleaned.get_columns() {
        assert_eq!(column.null_count(), 0);
    }
}

#[test]
fn test_partition_after_cleaning() {
    let df = load_houses();
    let (cleaned, _) = DataCleaner::new(NullStrategy::Auto)
        .clean(&df, &["city", "rooms", "age"], "price")
        .unwrap();

    let partition = detect_feature_types(&cleaned, &["city", "rooms", "age"]).unwrap();
    assert_eq!(partition.numeric, vec!["rooms", "age"]);
    assert_eq!(partition.categorical, vec!["city"]);
}

#[test]
fn test_missing_feature_named_before_cleaning() {
    let df = load_houses();
    let err = validate_selection(&df, "price", &["age", "garden"]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().contains("garden"));
}

#[test]
fn test_text_target_rejected() {
    let df = load_houses();
    let err = DataCleaner::new(NullStrategy::Mean)
        .clean(&df, &["age"], "city")
        .unwrap_err();
    assert!(matches!(err, ProcessingError::NonNumericTarget(ref c) if c == "city"));
}

// ============================================================================
// Profiling
// ============================================================================

#[test]
fn test_profiles_serialize_to_json() {
    let df = load_houses();

    let preview = DataProfiler::preview(&df, "houses.csv", 3).unwrap();
    let json = serde_json::to_value(&preview).unwrap();
    assert_eq!(json["total_rows"], 8);
    assert_eq!(json["null_summary"]["age"], 1);
    assert_eq!(json["preview"].as_array().unwrap().len(), 3);

    let eda = DataProfiler::eda(&df).unwrap();
    let json = serde_json::to_value(&eda).unwrap();
    assert!(json["correlation_matrix"]["rooms"]["price"].is_number());

    let recommendations = DataProfiler::recommend(&df).unwrap();
    let json = serde_json::to_value(&recommendations).unwrap();
    assert!(json["default_selection"]["target"].is_string());
}

#[test]
fn test_sanitized_profile_is_stable() {
    let df = load_houses();
    let eda = DataProfiler::eda(&df).unwrap();
    let once = serde_json::to_value(&eda).unwrap();
    let twice = serde_json::to_value(eda.sanitize()).unwrap();
    assert_eq!(once, twice);
}
