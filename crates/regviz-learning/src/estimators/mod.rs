//! Regression estimators.
//!
//! Every estimator fits a linear model `y ≈ X w + b` on an already
//! preprocessed design matrix. They share the [`Regressor`] capability trait
//! and differ only in how `w` is solved for:
//!
//! | Estimator | Solver |
//! |-----------|--------|
//! | [`LinearRegression`] | minimum-norm least squares (pseudo-inverse) |
//! | [`Ridge`] | `(XᵀX + αI) w = Xᵀy` by Cholesky |
//! | [`Lasso`] | cyclic coordinate descent, L1 penalty |
//! | [`ElasticNet`] | cyclic coordinate descent, mixed L1/L2 penalty |
//!
//! All of them centre `X` and `y` first, so the intercept is never penalized.
//! [`PolynomialExpansion`] is a feature step, not an estimator; it sits
//! between preprocessing and the linear solver in the polynomial candidate.

mod coordinate_descent;
pub(crate) mod linalg;
mod linear;
mod polynomial;

pub use coordinate_descent::{ElasticNet, Lasso};
pub use linear::{LinearRegression, Ridge};
pub use polynomial::PolynomialExpansion;

use crate::error::{RegressionError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Capability interface shared by every estimator.
pub trait Regressor {
    /// Fit on a design matrix and target vector of matching length.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict for every row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// Learned weights and intercept of a linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearCoefficients {
    pub weights: Array1<f64>,
    pub intercept: f64,
}

impl LinearCoefficients {
    pub(crate) fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.weights.len() {
            return Err(RegressionError::InvalidData(format!(
                "expected {} feature columns, got {}",
                self.weights.len(),
                x.ncols()
            )));
        }
        Ok(x.dot(&self.weights) + self.intercept)
    }
}

/// Centred copy of the training data plus the means that were removed.
pub(crate) struct Centered {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub x_mean: Array1<f64>,
    pub y_mean: f64,
}

impl Centered {
    /// Intercept that undoes the centring for the given weights.
    pub fn coefficients(self, weights: Array1<f64>) -> LinearCoefficients {
        let intercept = self.y_mean - weights.dot(&self.x_mean);
        LinearCoefficients { weights, intercept }
    }
}

/// Check shapes and values, then centre the training data.
pub(crate) fn center(x: &Array2<f64>, y: &Array1<f64>) -> Result<Centered> {
    if x.nrows() != y.len() {
        return Err(RegressionError::InvalidData(format!(
            "design matrix has {} rows but target has {} values",
            x.nrows(),
            y.len()
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(RegressionError::InvalidData(
            "training data contains non-finite values".to_string(),
        ));
    }

    let (Some(x_mean), Some(y_mean)) = (x.mean_axis(Axis(0)), y.mean()) else {
        return Err(RegressionError::InvalidData(
            "cannot fit on an empty training set".to_string(),
        ));
    };

    Ok(Centered {
        x: x - &x_mean.view().insert_axis(Axis(0)),
        y: y - y_mean,
        x_mean,
        y_mean,
    })
}

/// The estimator stage of a candidate pipeline.
///
/// A closed set of concrete estimators so fitted pipelines can be saved and
/// loaded without trait objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    Linear(LinearRegression),
    Ridge(Ridge),
    Lasso(Lasso),
    ElasticNet(ElasticNet),
}

impl Regressor for Estimator {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            Estimator::Linear(m) => m.fit(x, y),
            Estimator::Ridge(m) => m.fit(x, y),
            Estimator::Lasso(m) => m.fit(x, y),
            Estimator::ElasticNet(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Estimator::Linear(m) => m.predict(x),
            Estimator::Ridge(m) => m.predict(x),
            Estimator::Lasso(m) => m.predict(x),
            Estimator::ElasticNet(m) => m.predict(x),
        }
    }
}
