//! The regression request, end to end.
//!
//! [`RegressionService::run`] takes a loaded table and a column selection and
//! walks it through every stage:
//!
//! 1. **Validation** - trim column names, check the target and features exist
//! 2. **Cleaning** - restrict to the selected columns, resolve missing values
//! 3. **Preprocessing** - split features into numeric and categorical
//! 4. **Training** - fit and score every candidate, select the best
//! 5. **Persisting** - save the selected model, record its plot trace
//!
//! The response is sanitized before it is returned, so it can be serialized
//! to JSON as-is.
//!
//! # Example
//!
//! ```no_run
//! use regviz_learning::{RegressionConfig, RegressionService};
//! use regviz_processing::load_csv;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let df = load_csv("houses.csv")?;
//! let service = RegressionService::builder()
//!     .config(RegressionConfig::default())
//!     .on_progress(|update| println!("{:.0}% - {}", update.progress * 100.0, update.message))
//!     .build()?;
//!
//! let run = service.run(&df, "price", &["age", "city"], Some("mean"))?;
//! println!("Best model: {}", run.response.best_model);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The service is `Send + Sync`. Concurrent runs share only the plot store,
//! which keys traces by run.

use crate::catalog::{FittedModel, candidate_models};
use crate::config::RegressionConfig;
use crate::engine::{CandidateResult, TrainingEngine};
use crate::error::Result;
use crate::plot::PlotStore;
use crate::preprocess::PreprocessorPlan;
use crate::progress::{ProgressCallback, ProgressUpdate, TrainingStage, report};
use crate::storage::{FsModelStore, ModelStorage};
use crate::types::{
    DataInfo, ModelComparisonEntry, PlotTrace, RegressionResponse, RegressionRun, RunId,
};
use polars::prelude::DataFrame;
use regviz_processing::{
    DataCleaner, NullStrategy, Sanitize, detect_feature_types, normalize_column_names,
    validate_selection,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Runs regression requests against a model store and a plot store.
pub struct RegressionService {
    config: RegressionConfig,
    store: Box<dyn ModelStorage>,
    plots: PlotStore,
    progress: Option<ProgressCallback>,
}

static_assertions::assert_impl_all!(RegressionService: Send, Sync);

impl std::fmt::Debug for RegressionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegressionService")
            .field("config", &self.config)
            .field("plots", &self.plots)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish_non_exhaustive()
    }
}

impl RegressionService {
    /// Create a builder for the service.
    #[must_use]
    pub fn builder() -> RegressionServiceBuilder {
        RegressionServiceBuilder::default()
    }

    pub fn config(&self) -> &RegressionConfig {
        &self.config
    }

    /// Train, compare and select regression models for `target`.
    ///
    /// `null_strategy` overrides the configured default when given.
    ///
    /// # Errors
    ///
    /// - invalid input (missing columns, bad strategy, non-numeric target,
    ///   too few rows) as [`RegressionError::Processing`](crate::RegressionError::Processing)
    ///   or a split error
    /// - [`RegressionError::AllModelsFailed`](crate::RegressionError::AllModelsFailed)
    ///   if no candidate could be scored
    pub fn run<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        target: &str,
        features: &[S],
        null_strategy: Option<&str>,
    ) -> Result<RegressionRun> {
        self.report(TrainingStage::Initializing, 0.0, "Validating request");
        let df = normalize_column_names(df.clone())?;
        let selection = validate_selection(&df, target, features)?;
        let strategy = match null_strategy {
            Some(raw) => raw.parse::<NullStrategy>()?,
            None => self.config.null_strategy,
        };

        self.report(
            TrainingStage::Cleaning,
            0.1,
            format!("Cleaning data with '{strategy}' strategy"),
        );
        let (cleaned, cleaning) =
            DataCleaner::new(strategy).clean(&df, &selection.features, &selection.target)?;
        info!(
            "Cleaned data: {} -> {} rows",
            cleaning.rows_before, cleaning.rows_after
        );

        self.report(TrainingStage::Preprocessing, 0.2, "Detecting feature types");
        let partition = detect_feature_types(&cleaned, &selection.features)?;
        let plan = PreprocessorPlan::from_partition(&partition)?;
        info!(
            "Features: {} numeric, {} categorical",
            partition.numeric.len(),
            partition.categorical.len()
        );

        let report = TrainingEngine::new(&self.config)
            .with_progress(self.progress.clone())
            .train_and_select(&cleaned, &selection.target, &candidate_models(&plan))?;

        self.report(TrainingStage::Persisting, 0.9, "Saving best model");
        let selected = report.selected;
        let saved = self.store.save(&selected.model, selected.model.name())?;

        let run_id = self.plots.next_run_id();
        self.plots.record(run_id, selected.trace.clone());

        let model_comparison: BTreeMap<String, ModelComparisonEntry> = report
            .outcomes
            .into_iter()
            .map(|outcome| {
                let entry = match outcome.result {
                    CandidateResult::Scored(metrics) => ModelComparisonEntry::Scored(metrics),
                    CandidateResult::Failed(error) => ModelComparisonEntry::Failed { error },
                };
                (outcome.name, entry)
            })
            .collect();

        let response = RegressionResponse {
            best_model: selected.model.name().to_string(),
            model_comparison,
            feature_engineering: partition,
            data_info: DataInfo {
                rows: cleaned.height(),
                train_rows: report.train_rows,
                test_rows: report.test_rows,
                null_strategy: strategy,
            },
            saved_model_filename: saved.filename,
        }
        .sanitize();

        self.report(TrainingStage::Complete, 1.0, "Training complete");
        info!("{} finished, best model {}", run_id, response.best_model);

        Ok(RegressionRun {
            run_id,
            response,
            plot: selected.trace,
        })
    }

    /// Plot trace of the most recent run.
    pub fn latest_plot(&self) -> Result<PlotTrace> {
        self.plots.latest()
    }

    /// Plot trace of `run_id`; only the most recent run is retained.
    pub fn plot(&self, run_id: RunId) -> Result<PlotTrace> {
        self.plots.get(run_id)
    }

    /// Path of a saved model, for download.
    pub fn model_path(&self, filename: &str) -> Result<PathBuf> {
        self.store.resolve(filename)
    }

    /// Load a saved model by file name.
    pub fn load_model(&self, filename: &str) -> Result<FittedModel> {
        let path = self.store.resolve(filename)?;
        self.store.load(&path)
    }

    fn report(&self, stage: TrainingStage, progress: f64, message: impl Into<String>) {
        report(
            self.progress.as_ref(),
            ProgressUpdate::new(stage, progress, message),
        );
    }
}

/// Builder for [`RegressionService`].
///
/// # Optional Configuration
///
/// - [`config()`](Self::config): run settings (default: [`RegressionConfig::default()`])
/// - [`store()`](Self::store): model storage (default: [`FsModelStore`] at `config.model_dir`)
/// - [`on_progress()`](Self::on_progress): progress callback
#[derive(Default)]
pub struct RegressionServiceBuilder {
    config: Option<RegressionConfig>,
    store: Option<Box<dyn ModelStorage>>,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for RegressionServiceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegressionServiceBuilder")
            .field("config", &self.config)
            .field("store", &self.store.as_ref().map(|_| "<store>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl RegressionServiceBuilder {
    #[must_use]
    pub fn config(mut self, config: RegressionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom model store instead of the file-system default.
    #[must_use]
    pub fn store(mut self, store: impl ModelStorage + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Set the progress callback.
    ///
    /// The callback runs inline with training and should return quickly.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Build the service.
    ///
    /// # Errors
    ///
    /// Returns [`RegressionError::InvalidConfig`](crate::RegressionError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn build(self) -> Result<RegressionService> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let store = match self.store {
            Some(store) => store,
            None => Box::new(FsModelStore::new(config.model_dir.clone())),
        };

        Ok(RegressionService {
            config,
            store,
            plots: PlotStore::new(),
            progress: self.progress_callback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegressionError;
    use polars::prelude::*;
    use std::sync::Mutex;

    fn service(dir: &std::path::Path) -> RegressionService {
        RegressionService::builder()
            .config(RegressionConfig::builder().model_dir(dir).build().unwrap())
            .build()
            .unwrap()
    }

    fn houses() -> DataFrame {
        let n = 20;
        let age: Vec<Option<f64>> = (0..n)
            .map(|i| if i == 3 { None } else { Some(10.0 + i as f64) })
            .collect();
        let city: Vec<&str> = (0..n)
            .map(|i| ["Paris", "Berlin", "Rome"][i % 3])
            .collect();
        let price: Vec<f64> = (0..n)
            .map(|i| 100.0 + 4.0 * i as f64 + [0.0, 25.0, 10.0][i % 3] + (i as f64).cos())
            .collect();
        df! { " age " => age, "city" => city, "price" => price }.unwrap()
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let run = service
            .run(&houses(), "price", &["age", "city"], Some("mean"))
            .unwrap();

        let response = &run.response;
        assert_eq!(response.model_comparison.len(), 5);
        assert!(response.model_comparison.contains_key(&response.best_model));
        assert!(response.saved_model_filename.starts_with(&response.best_model));
        assert_eq!(response.feature_engineering.numeric, vec!["age"]);
        assert_eq!(response.feature_engineering.categorical, vec!["city"]);
        assert_eq!(response.data_info.rows, 20);
        assert_eq!(response.data_info.test_rows, 4);
        assert_eq!(response.data_info.null_strategy, NullStrategy::Mean);

        assert_eq!(service.latest_plot().unwrap(), run.plot);
        assert_eq!(service.plot(run.run_id).unwrap().test.len(), 4);
        assert!(service.model_path(&response.saved_model_filename).is_ok());
    }

    #[test]
    fn test_default_strategy_drops_rows() {
        let dir = tempfile::tempdir().unwrap();
        let run = service(dir.path())
            .run(&houses(), "price", &["age", "city"], None)
            .unwrap();
        assert_eq!(run.response.data_info.rows, 19);
        assert_eq!(run.response.data_info.null_strategy, NullStrategy::Drop);
    }

    #[test]
    fn test_unsupported_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let err = service(dir.path())
            .run(&houses(), "price", &["age"], Some("median"))
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_NULL_STRATEGY");
    }

    #[test]
    fn test_latest_plot_before_run() {
        let dir = tempfile::tempdir().unwrap();
        let err = service(dir.path()).latest_plot().unwrap_err();
        assert!(matches!(err, RegressionError::PlotNotFound));
    }

    #[test]
    fn test_invalid_config_rejected_at_build() {
        let config = RegressionConfig {
            test_size: 1.5,
            ..RegressionConfig::default()
        };
        let err = RegressionService::builder().config(config).build().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_progress_stages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);
        let service = RegressionService::builder()
            .config(RegressionConfig::builder().model_dir(dir.path()).build().unwrap())
            .on_progress(move |u| sink.lock().unwrap().push((u.stage, u.progress)))
            .build()
            .unwrap();

        service
            .run(&houses(), "price", &["age", "city"], Some("auto"))
            .unwrap();

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first().unwrap().0, TrainingStage::Initializing);
        assert_eq!(stages.last().unwrap().0, TrainingStage::Complete);
        assert!(stages.windows(2).all(|w| w[0].1 <= w[1].1));
    }
}
