//! Training and selection.
//!
//! [`TrainingEngine::train_and_select`] splits the cleaned table once, fits
//! every candidate on the training rows, scores it on both partitions and
//! keeps the candidate with the highest defined test R². A candidate that
//! fails to fit or produces non-finite predictions is recorded as a failure
//! and the run moves on to the next one.

use crate::catalog::{CandidateModel, FittedModel};
use crate::config::RegressionConfig;
use crate::error::{RegressionError, Result};
use crate::progress::{ProgressCallback, ProgressUpdate, TrainingStage, report};
use crate::types::{ModelMetrics, PlotTrace, SplitTrace};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use regviz_processing::utils::numeric_values;
use tracing::{debug, info, warn};

/// Fewest rows a test partition needs for R² to mean anything.
pub const MIN_TEST_ROWS: usize = 2;

// Overall progress covered by the candidate loop.
const TRAINING_PROGRESS_START: f64 = 0.3;
const TRAINING_PROGRESS_END: f64 = 0.8;

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// `None` with fewer than two samples or a constant target.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    let n = y_true.len();
    if n < 2 || n != y_pred.len() {
        return None;
    }
    let mean = y_true.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return None;
    }
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

/// Mean of squared residuals. `None` for empty or mismatched input.
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return None;
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    Some(sum / y_true.len() as f64)
}

/// A seeded train/test partition of the cleaned table.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: DataFrame,
    pub test: DataFrame,
    pub y_train: Vec<f64>,
    pub y_test: Vec<f64>,
}

impl TrainTestSplit {
    /// Shuffle row indices with `seed`; the first `ceil(test_size * n)` go
    /// to the test partition, the rest to training.
    pub fn new(df: &DataFrame, target: &str, test_size: f64, seed: u64) -> Result<Self> {
        let n = df.height();
        let n_test = (test_size * n as f64).ceil() as usize;
        if n_test < MIN_TEST_ROWS {
            return Err(RegressionError::InsufficientTestSamples { test_rows: n_test });
        }
        let n_train = n.saturating_sub(n_test);
        if n_train == 0 {
            return Err(RegressionError::InsufficientTrainSamples);
        }

        let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
        let train_idx = indices.split_off(n_test);

        let test = df.take(&IdxCa::from_vec("idx".into(), indices))?;
        let train = df.take(&IdxCa::from_vec("idx".into(), train_idx))?;
        debug!("Split {} rows into {} train / {} test", n, n_train, n_test);

        Ok(Self {
            y_train: target_values(&train, target)?,
            y_test: target_values(&test, target)?,
            train,
            test,
        })
    }
}

fn target_values(df: &DataFrame, target: &str) -> Result<Vec<f64>> {
    numeric_values(df.column(target)?.as_materialized_series())?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                RegressionError::InvalidData(format!("target '{target}' contains missing values"))
            })
        })
        .collect()
}

/// Whether a candidate was scored or why it was not.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateResult {
    Scored(ModelMetrics),
    Failed(String),
}

/// Result of one candidate, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOutcome {
    pub name: String,
    pub result: CandidateResult,
}

/// The winning candidate of a run.
#[derive(Debug, Clone)]
pub struct Selection {
    pub model: FittedModel,
    pub metrics: ModelMetrics,
    pub trace: PlotTrace,
}

/// Everything the engine learned in one run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub outcomes: Vec<CandidateOutcome>,
    pub selected: Selection,
    pub train_rows: usize,
    pub test_rows: usize,
}

struct Scored {
    model: FittedModel,
    metrics: ModelMetrics,
    train_pred: Vec<f64>,
    test_pred: Vec<f64>,
}

/// Fits, scores and selects candidates.
#[derive(Clone)]
pub struct TrainingEngine {
    test_size: f64,
    random_seed: u64,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for TrainingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingEngine")
            .field("test_size", &self.test_size)
            .field("random_seed", &self.random_seed)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl TrainingEngine {
    pub fn new(config: &RegressionConfig) -> Self {
        Self {
            test_size: config.test_size,
            random_seed: config.random_seed,
            progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, callback: Option<ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Split `df`, evaluate every candidate and return the best one.
    ///
    /// # Errors
    ///
    /// - [`RegressionError::InsufficientTestSamples`] / [`InsufficientTrainSamples`](RegressionError::InsufficientTrainSamples)
    ///   if the split is unusable
    /// - [`RegressionError::AllModelsFailed`] if no candidate has a defined test R²
    pub fn train_and_select(
        &self,
        df: &DataFrame,
        target: &str,
        candidates: &[CandidateModel],
    ) -> Result<TrainingReport> {
        let split = TrainTestSplit::new(df, target, self.test_size, self.random_seed)?;
        let total = candidates.len() as u32;

        let mut outcomes = Vec::with_capacity(candidates.len());
        let mut best: Option<Scored> = None;
        let mut best_score = f64::NEG_INFINITY;

        for (i, candidate) in candidates.iter().enumerate() {
            let name = candidate.name();
            report(
                self.progress.as_ref(),
                ProgressUpdate::new(
                    TrainingStage::Training,
                    training_progress(i, candidates.len()),
                    format!("Training {name}"),
                )
                .with_model(name, i as u32, total),
            );

            let (result, scored) = score_candidate(candidate, &split);
            if let Some(scored) = scored
                && let Some(score) = scored.metrics.test_r2
                && score > best_score
            {
                best_score = score;
                best = Some(scored);
            }
            outcomes.push(CandidateOutcome {
                name: name.to_string(),
                result,
            });
        }

        let best = best.ok_or(RegressionError::AllModelsFailed)?;
        info!("Selected {} (test_r2={:.4})", best.model.name(), best_score);
        report(
            self.progress.as_ref(),
            ProgressUpdate::new(
                TrainingStage::Selection,
                TRAINING_PROGRESS_END,
                format!("Selected {}", best.model.name()),
            ),
        );

        let trace = PlotTrace {
            train: SplitTrace::new(split.y_train.clone(), best.train_pred),
            test: SplitTrace::new(split.y_test.clone(), best.test_pred),
        };

        Ok(TrainingReport {
            outcomes,
            selected: Selection {
                model: best.model,
                metrics: best.metrics,
                trace,
            },
            train_rows: split.y_train.len(),
            test_rows: split.y_test.len(),
        })
    }
}

fn training_progress(done: usize, total: usize) -> f64 {
    if total == 0 {
        return TRAINING_PROGRESS_START;
    }
    TRAINING_PROGRESS_START
        + (TRAINING_PROGRESS_END - TRAINING_PROGRESS_START) * done as f64 / total as f64
}

/// Evaluate one candidate, turning any error into a recorded failure.
fn score_candidate(
    candidate: &CandidateModel,
    split: &TrainTestSplit,
) -> (CandidateResult, Option<Scored>) {
    let name = candidate.name();
    match evaluate(candidate, split) {
        Ok(scored) => {
            let metrics = scored.metrics;
            info!(
                "{}: train_r2={:?} test_r2={:?} test_mse={:?}",
                name, metrics.train_r2, metrics.test_r2, metrics.test_mse
            );
            (CandidateResult::Scored(metrics), Some(scored))
        }
        Err(err) => {
            warn!("{} failed: {}", name, err);
            (CandidateResult::Failed(err.to_string()), None)
        }
    }
}

/// Fit one candidate on the training rows and score it on both partitions.
fn evaluate(candidate: &CandidateModel, split: &TrainTestSplit) -> Result<Scored> {
    let model = candidate.fit(&split.train, &split.y_train)?;
    let train_pred = model.predict(&split.train)?;
    let test_pred = model.predict(&split.test)?;

    if train_pred.iter().chain(&test_pred).any(|p| !p.is_finite()) {
        return Err(RegressionError::InvalidData(format!(
            "{} produced non-finite predictions",
            candidate.name()
        )));
    }

    let metrics = ModelMetrics {
        train_r2: r2_score(&split.y_train, &train_pred),
        test_r2: r2_score(&split.y_test, &test_pred),
        test_mse: mean_squared_error(&split.y_test, &test_pred),
    };
    Ok(Scored {
        model,
        metrics,
        train_pred,
        test_pred,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ModelKind, candidate_models};
    use crate::preprocess::PreprocessorPlan;
    use std::sync::{Arc, Mutex};

    fn table(n: usize) -> DataFrame {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 1.0 + (v * 0.7).sin()).collect();
        df! { "x" => x, "y" => y }.unwrap()
    }

    fn plan() -> PreprocessorPlan {
        PreprocessorPlan::new(vec!["x".into()], vec![]).unwrap()
    }

    fn engine() -> TrainingEngine {
        TrainingEngine::new(&RegressionConfig::default())
    }

    #[test]
    fn test_r2_score() {
        assert_eq!(r2_score(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), Some(1.0));
        assert_eq!(r2_score(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]), Some(0.0));
        assert_eq!(r2_score(&[4.0, 4.0], &[4.0, 5.0]), None);
        assert_eq!(r2_score(&[4.0], &[4.0]), None);
    }

    #[test]
    fn test_mean_squared_error() {
        assert_eq!(mean_squared_error(&[1.0, 3.0], &[2.0, 1.0]), Some(2.5));
        assert_eq!(mean_squared_error(&[], &[]), None);
    }

    #[test]
    fn test_split_sizes() {
        let split = TrainTestSplit::new(&table(10), "y", 0.2, 42).unwrap();
        assert_eq!(split.test.height(), 2);
        assert_eq!(split.train.height(), 8);
        assert_eq!(split.y_test.len(), 2);

        // ceil(0.2 * 11) = 3
        let split = TrainTestSplit::new(&table(11), "y", 0.2, 42).unwrap();
        assert_eq!(split.y_test.len(), 3);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = TrainTestSplit::new(&table(20), "y", 0.25, 7).unwrap();
        let mut all: Vec<f64> = split.y_train.iter().chain(&split.y_test).copied().collect();
        all.sort_by(f64::total_cmp);
        let mut expected = numeric_values(table(20).column("y").unwrap().as_materialized_series())
            .unwrap()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        expected.sort_by(f64::total_cmp);
        assert_eq!(all, expected);
    }

    #[test]
    fn test_split_is_seeded() {
        let a = TrainTestSplit::new(&table(30), "y", 0.2, 42).unwrap();
        let b = TrainTestSplit::new(&table(30), "y", 0.2, 42).unwrap();
        assert_eq!(a.y_test, b.y_test);
    }

    #[test]
    fn test_split_too_few_rows() {
        let err = TrainTestSplit::new(&table(3), "y", 0.2, 42).unwrap_err();
        assert!(matches!(
            err,
            RegressionError::InsufficientTestSamples { test_rows: 1 }
        ));
    }

    #[test]
    fn test_split_no_training_rows() {
        let err = TrainTestSplit::new(&table(3), "y", 0.9, 42).unwrap_err();
        assert!(matches!(err, RegressionError::InsufficientTrainSamples));
    }

    #[test]
    fn test_selects_best_and_traces_it() {
        let report = engine()
            .train_and_select(&table(30), "y", &candidate_models(&plan()))
            .unwrap();

        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.train_rows, 24);
        assert_eq!(report.test_rows, 6);

        let best_score = report
            .outcomes
            .iter()
            .filter_map(|o| match &o.result {
                CandidateResult::Scored(m) => m.test_r2,
                CandidateResult::Failed(_) => None,
            })
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(report.selected.metrics.test_r2, Some(best_score));

        assert_eq!(report.selected.trace.train.len(), 24);
        assert_eq!(report.selected.trace.test.y_pred.len(), 6);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        // Two identical OLS pipelines score exactly the same.
        let candidates = vec![
            CandidateModel::new(ModelKind::LinearRegression, plan()),
            CandidateModel::new(ModelKind::LinearRegression, plan()),
        ];
        let report = engine()
            .train_and_select(&table(20), "y", &candidates)
            .unwrap();
        assert_eq!(report.selected.model.kind, ModelKind::LinearRegression);
        assert_eq!(report.outcomes[0].result, report.outcomes[1].result);
    }

    #[test]
    fn test_failed_candidate_is_recorded() {
        // The plan references a column the table does not have.
        let broken = PreprocessorPlan::new(vec!["missing".into()], vec![]).unwrap();
        let candidates = vec![
            CandidateModel::new(ModelKind::Ridge, broken),
            CandidateModel::new(ModelKind::Lasso, plan()),
        ];
        let report = engine()
            .train_and_select(&table(20), "y", &candidates)
            .unwrap();
        assert!(matches!(report.outcomes[0].result, CandidateResult::Failed(_)));
        assert_eq!(report.selected.model.kind, ModelKind::Lasso);
    }

    #[test]
    fn test_non_finite_predictions_fail_the_candidate() {
        // Squaring the out-of-range test value overflows.
        let train = table(10);
        let test = df! { "x" => [1e200, 2.0], "y" => [1.0, 7.0] }.unwrap();
        let split = TrainTestSplit {
            y_train: numeric_values(train.column("y").unwrap().as_materialized_series())
                .unwrap()
                .into_iter()
                .flatten()
                .collect(),
            y_test: vec![1.0, 7.0],
            train,
            test,
        };

        let candidate = CandidateModel::new(ModelKind::PolynomialRegression, plan());
        let (result, scored) = score_candidate(&candidate, &split);

        assert!(scored.is_none());
        match result {
            CandidateResult::Failed(message) => {
                assert!(message.contains("non-finite predictions"), "{message}")
            }
            other => panic!("expected a failure, got {other:?}"),
        }
    }

    #[test]
    fn test_all_failed() {
        let broken = PreprocessorPlan::new(vec!["missing".into()], vec![]).unwrap();
        let err = engine()
            .train_and_select(&table(20), "y", &candidate_models(&broken))
            .unwrap_err();
        assert!(matches!(err, RegressionError::AllModelsFailed));
    }

    #[test]
    fn test_constant_target_has_no_winner() {
        let df = df! { "x" => (0..10).map(f64::from).collect::<Vec<_>>(), "y" => vec![5.0; 10] }
            .unwrap();
        let err = engine()
            .train_and_select(&df, "y", &candidate_models(&plan()))
            .unwrap_err();
        assert_eq!(err.error_code(), "ALL_MODELS_FAILED");
    }

    #[test]
    fn test_reports_progress_per_candidate() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |u: ProgressUpdate| {
            sink.lock().unwrap().push((u.stage, u.models_completed));
        });

        engine()
            .with_progress(Some(callback))
            .train_and_select(&table(20), "y", &candidate_models(&plan()))
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], (TrainingStage::Training, Some((0, 5))));
        assert_eq!(seen[5].0, TrainingStage::Selection);
    }
}
