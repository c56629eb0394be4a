//! Integration tests for the regression service.
//!
//! These tests run full requests against a CSV fixture and a temporary model
//! directory, checking the response contract, error reporting and the saved
//! artifacts.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use regviz_learning::{
    FsModelStore, ModelComparisonEntry, ModelStorage, NullStrategy, RegressionConfig,
    RegressionError, RegressionService,
};
use regviz_processing::{ErrorKind, ProcessingError, load_csv};
use std::path::PathBuf;
use tempfile::TempDir;

const MODEL_NAMES: [&str; 5] = [
    "LinearRegression",
    "Ridge",
    "Lasso",
    "ElasticNet",
    "PolynomialRegression",
];

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_houses() -> DataFrame {
    load_csv(fixtures_path().join("houses.csv")).expect("Failed to read fixture")
}

fn service(dir: &TempDir) -> RegressionService {
    let config = RegressionConfig::builder()
        .model_dir(dir.path())
        .build()
        .expect("valid config");
    RegressionService::builder()
        .config(config)
        .build()
        .expect("service builds")
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_mean_strategy_end_to_end() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    let df = load_houses();

    let run = service
        .run(&df, "price", &["age", "city"], Some("mean"))
        .unwrap();
    let response = &run.response;

    assert!(MODEL_NAMES.contains(&response.best_model.as_str()));
    let mut attempted: Vec<&str> = response.model_comparison.keys().map(String::as_str).collect();
    attempted.sort_unstable();
    let mut expected = MODEL_NAMES.to_vec();
    expected.sort_unstable();
    assert_eq!(attempted, expected);

    assert!(
        response
            .saved_model_filename
            .starts_with(&format!("{}_", response.best_model))
    );
    assert!(response.saved_model_filename.ends_with(".json"));
    assert!(dir.path().join(&response.saved_model_filename).is_file());

    assert_eq!(response.feature_engineering.numeric, vec!["age"]);
    assert_eq!(response.feature_engineering.categorical, vec!["city"]);
    assert_eq!(response.data_info.rows, 24);
    assert_eq!(response.data_info.test_rows, 5);
    assert_eq!(response.data_info.train_rows, 19);
    assert_eq!(response.data_info.null_strategy, NullStrategy::Mean);
}

#[test]
fn test_response_json_contract() {
    let dir = TempDir::new().unwrap();
    let run = service(&dir)
        .run(&load_houses(), "price", &["age", "rooms", "city"], Some("auto"))
        .unwrap();

    let value = serde_json::to_value(&run.response).unwrap();
    let object = value.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "best_model",
            "data_info",
            "feature_engineering",
            "model_comparison",
            "saved_model_filename"
        ]
    );

    for entry in value["model_comparison"].as_object().unwrap().values() {
        let has_metrics = entry.get("test_mse").is_some() && entry.get("train_r2").is_some();
        let has_error = entry.get("error").is_some();
        assert!(has_metrics ^ has_error, "unexpected entry {entry}");
    }
    assert_eq!(
        value["feature_engineering"]["numeric_features"],
        serde_json::json!(["age", "rooms"])
    );
    assert_eq!(value["data_info"]["null_strategy"], "auto");
}

#[test]
fn test_drop_strategy_removes_incomplete_row() {
    let dir = TempDir::new().unwrap();
    let run = service(&dir)
        .run(&load_houses(), "price", &["age", "city"], Some("drop"))
        .unwrap();
    assert_eq!(run.response.data_info.rows, 23);
}

#[test]
fn test_selection_is_deterministic() {
    let df = load_houses();
    let a = service(&TempDir::new().unwrap())
        .run(&df, "price", &["age", "rooms", "city"], Some("mean"))
        .unwrap();
    let b = service(&TempDir::new().unwrap())
        .run(&df, "price", &["age", "rooms", "city"], Some("mean"))
        .unwrap();

    assert_eq!(a.response.best_model, b.response.best_model);
    assert_eq!(a.response.model_comparison, b.response.model_comparison);
    assert_eq!(a.plot, b.plot);
}

#[test]
fn test_best_model_has_highest_test_r2() {
    let dir = TempDir::new().unwrap();
    let run = service(&dir)
        .run(&load_houses(), "price", &["age", "rooms", "city"], Some("mean"))
        .unwrap();
    let comparison = &run.response.model_comparison;

    let best = comparison[&run.response.best_model]
        .metrics()
        .and_then(|m| m.test_r2)
        .unwrap();
    for entry in comparison.values() {
        if let Some(score) = entry.metrics().and_then(|m| m.test_r2) {
            assert!(score <= best);
        }
    }
}

// ============================================================================
// Invalid input
// ============================================================================

#[test]
fn test_non_numeric_target_names_column() {
    let dir = TempDir::new().unwrap();
    let err = service(&dir)
        .run(&load_houses(), "city", &["age"], Some("mean"))
        .unwrap_err();

    assert!(matches!(
        err,
        RegressionError::Processing(ProcessingError::NonNumericTarget(ref column)) if column == "city"
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_missing_feature_names_column() {
    let dir = TempDir::new().unwrap();
    let err = service(&dir)
        .run(&load_houses(), "price", &["age", "zipcode"], None)
        .unwrap_err();

    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    assert!(err.to_string().contains("zipcode"));
    // Nothing was trained, so nothing was saved.
    assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
}

#[test]
fn test_target_cannot_be_a_feature() {
    let dir = TempDir::new().unwrap();
    let err = service(&dir)
        .run(&load_houses(), "price", &["age", "price"], Some("mean"))
        .unwrap_err();

    assert!(matches!(
        err,
        RegressionError::Processing(ProcessingError::TargetInFeatures(ref column)) if column == "price"
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
}

#[test]
fn test_three_rows_is_not_enough() {
    let df = df! {
        "x" => [1.0, 2.0, 3.0],
        "y" => [2.0, 4.0, 6.0],
    }
    .unwrap();
    let dir = TempDir::new().unwrap();
    let err = service(&dir).run(&df, "y", &["x"], None).unwrap_err();

    assert!(matches!(err, RegressionError::InsufficientTestSamples { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().contains("Not enough test samples"));
}

#[test]
fn test_constant_target_fails_systemically() {
    let df = df! {
        "x" => (0..12).map(f64::from).collect::<Vec<_>>(),
        "y" => vec![3.0; 12],
    }
    .unwrap();
    let dir = TempDir::new().unwrap();
    let err = service(&dir).run(&df, "y", &["x"], None).unwrap_err();

    assert!(matches!(err, RegressionError::AllModelsFailed));
    assert_eq!(err.kind(), ErrorKind::Systemic);
}

// ============================================================================
// Plot and persistence
// ============================================================================

#[test]
fn test_plot_not_found_before_first_run() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    assert!(matches!(
        service.latest_plot(),
        Err(RegressionError::PlotNotFound)
    ));

    let run = service
        .run(&load_houses(), "price", &["age", "city"], Some("mean"))
        .unwrap();
    let plot = service.latest_plot().unwrap();
    assert_eq!(plot, run.plot);
    assert_eq!(plot.train.y_actual.len(), plot.train.y_pred.len());
    assert_eq!(plot.test.len(), run.response.data_info.test_rows);
}

#[test]
fn test_only_latest_plot_is_retained() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    let df = load_houses();

    let first = service.run(&df, "price", &["age", "city"], Some("mean")).unwrap();
    let second = service.run(&df, "price", &["age", "rooms"], Some("drop")).unwrap();
    assert_ne!(first.run_id, second.run_id);

    assert!(matches!(
        service.plot(first.run_id),
        Err(RegressionError::PlotNotFound)
    ));
    assert_eq!(service.plot(second.run_id).unwrap(), second.plot);
    assert_eq!(service.latest_plot().unwrap(), second.plot);
}

#[test]
fn test_saved_model_reloads_and_predicts() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    let df = load_houses();
    let run = service
        .run(&df, "price", &["age", "rooms", "city"], Some("mean"))
        .unwrap();

    let model = service
        .load_model(&run.response.saved_model_filename)
        .unwrap();
    assert_eq!(model.name(), run.response.best_model);

    let new_rows = df! {
        "age" => [30i64, 45],
        "rooms" => [2i64, 4],
        "city" => ["Paris", "Lisbon"],
    }
    .unwrap();
    let predictions = model.predict(&new_rows).unwrap();
    assert_eq!(predictions.len(), 2);
    assert!(predictions.iter().all(|p| p.is_finite()));
}

#[test]
fn test_unknown_model_download() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    let err = service.model_path("Ridge_19700101_000000_000.json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(service.model_path("../Cargo.toml").is_err());
}

#[test]
fn test_custom_store_is_used() {
    let models = TempDir::new().unwrap();
    let unused = TempDir::new().unwrap();
    let config = RegressionConfig::builder()
        .model_dir(unused.path())
        .build()
        .unwrap();
    let service = RegressionService::builder()
        .config(config)
        .store(FsModelStore::new(models.path()))
        .build()
        .unwrap();

    let run = service
        .run(&load_houses(), "price", &["age"], Some("mean"))
        .unwrap();
    let store = FsModelStore::new(models.path());
    assert!(store.resolve(&run.response.saved_model_filename).is_ok());
    assert!(
        run.response
            .model_comparison
            .values()
            .all(|entry| matches!(entry, ModelComparisonEntry::Scored(_)))
    );
}
