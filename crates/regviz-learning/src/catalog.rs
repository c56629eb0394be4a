//! The fixed set of candidate regression pipelines.
//!
//! Each candidate is the shared preprocessing plan followed by one estimator.
//! The polynomial candidate adds a degree-2 expansion between the two.

use crate::error::{RegressionError, Result};
use crate::estimators::{
    ElasticNet, Estimator, Lasso, LinearRegression, PolynomialExpansion, Regressor, Ridge,
};
use crate::preprocess::{FittedPreprocessor, PreprocessorPlan};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const RIDGE_ALPHA: f64 = 1.0;
pub const LASSO_ALPHA: f64 = 0.01;
pub const ELASTIC_NET_ALPHA: f64 = 0.01;
pub const ELASTIC_NET_L1_RATIO: f64 = 0.5;
pub const POLYNOMIAL_DEGREE: usize = 2;

/// Identity of a candidate model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    LinearRegression,
    Ridge,
    Lasso,
    ElasticNet,
    PolynomialRegression,
}

impl ModelKind {
    /// Every candidate, in the order they are trained.
    pub const ALL: [ModelKind; 5] = [
        ModelKind::LinearRegression,
        ModelKind::Ridge,
        ModelKind::Lasso,
        ModelKind::ElasticNet,
        ModelKind::PolynomialRegression,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "LinearRegression",
            ModelKind::Ridge => "Ridge",
            ModelKind::Lasso => "Lasso",
            ModelKind::ElasticNet => "ElasticNet",
            ModelKind::PolynomialRegression => "PolynomialRegression",
        }
    }

    fn estimator(&self) -> Estimator {
        match self {
            ModelKind::LinearRegression | ModelKind::PolynomialRegression => {
                Estimator::Linear(LinearRegression::new())
            }
            ModelKind::Ridge => Estimator::Ridge(Ridge::new(RIDGE_ALPHA)),
            ModelKind::Lasso => Estimator::Lasso(Lasso::new(LASSO_ALPHA)),
            ModelKind::ElasticNet => {
                Estimator::ElasticNet(ElasticNet::new(ELASTIC_NET_ALPHA, ELASTIC_NET_L1_RATIO))
            }
        }
    }

    fn expansion_degree(&self) -> Option<usize> {
        matches!(self, ModelKind::PolynomialRegression).then_some(POLYNOMIAL_DEGREE)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unfitted candidate pipeline.
#[derive(Debug, Clone)]
pub struct CandidateModel {
    kind: ModelKind,
    plan: PreprocessorPlan,
    expansion_degree: Option<usize>,
    estimator: Estimator,
}

impl CandidateModel {
    pub fn new(kind: ModelKind, plan: PreprocessorPlan) -> Self {
        Self {
            kind,
            plan,
            expansion_degree: kind.expansion_degree(),
            estimator: kind.estimator(),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Fit preprocessing, the optional expansion and the estimator on `df`.
    pub fn fit(&self, df: &DataFrame, y: &[f64]) -> Result<FittedModel> {
        let preprocessor = self.plan.fit(df)?;
        let mut x = preprocessor.transform(df)?;

        let expansion = match self.expansion_degree {
            Some(degree) => {
                let expansion = PolynomialExpansion::new(degree, x.ncols())?;
                x = expansion.transform(&x)?;
                Some(expansion)
            }
            None => None,
        };

        let mut estimator = self.estimator.clone();
        estimator.fit(&x, &Array1::from(y.to_vec()))?;
        debug!("{} fitted on {} x {} design matrix", self.kind, x.nrows(), x.ncols());

        Ok(FittedModel {
            kind: self.kind,
            features: self
                .plan
                .numeric()
                .iter()
                .chain(self.plan.categorical())
                .cloned()
                .collect(),
            preprocessor,
            expansion,
            estimator,
        })
    }
}

/// Build the candidates, in training order, around one preprocessing plan.
pub fn candidate_models(plan: &PreprocessorPlan) -> Vec<CandidateModel> {
    ModelKind::ALL
        .iter()
        .map(|kind| CandidateModel::new(*kind, plan.clone()))
        .collect()
}

/// A fitted pipeline: learned preprocessing, optional expansion, fitted estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub kind: ModelKind,
    /// Raw input columns the pipeline reads.
    pub features: Vec<String>,
    pub preprocessor: FittedPreprocessor,
    pub expansion: Option<PolynomialExpansion>,
    pub estimator: Estimator,
}

impl FittedModel {
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Predict for every row of `df`.
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<f64>> {
        let mut x = self.preprocessor.transform(df)?;
        if let Some(expansion) = &self.expansion {
            x = expansion.transform(&x)?;
        }
        Ok(self.estimator.predict(&x)?.to_vec())
    }

    /// Names of the columns the estimator sees.
    pub fn design_feature_names(&self) -> Vec<String> {
        let names = self.preprocessor.feature_names();
        match &self.expansion {
            Some(expansion) => expansion.feature_names(&names),
            None => names,
        }
    }
}

impl TryFrom<&str> for ModelKind {
    type Error = RegressionError;

    fn try_from(name: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| RegressionError::InvalidConfig(format!("unknown model '{name}'")))
    }
}
