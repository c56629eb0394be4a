//! Polynomial feature expansion.

use crate::error::{RegressionError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Expands `[a, b]` into every monomial of degree `1..=degree`, in graded
/// lexicographic order and without a bias column:
/// `[a, b, a², ab, b²]` for degree 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialExpansion {
    pub degree: usize,
    /// Input column indices multiplied together for each output column.
    combinations: Vec<Vec<usize>>,
    n_features_in: usize,
}

impl PolynomialExpansion {
    /// Build the expansion for `n_features_in` input columns.
    pub fn new(degree: usize, n_features_in: usize) -> Result<Self> {
        if degree == 0 {
            return Err(RegressionError::InvalidConfig(
                "polynomial degree must be at least 1".to_string(),
            ));
        }
        if n_features_in == 0 {
            return Err(RegressionError::InvalidData(
                "polynomial expansion needs at least one input column".to_string(),
            ));
        }

        let mut combinations = Vec::new();
        for d in 1..=degree {
            let mut current = Vec::with_capacity(d);
            push_combinations(n_features_in, d, 0, &mut current, &mut combinations);
        }

        Ok(Self {
            degree,
            combinations,
            n_features_in,
        })
    }

    pub fn n_features_out(&self) -> usize {
        self.combinations.len()
    }

    /// Names of the output columns, built from the input names.
    pub fn feature_names(&self, input: &[String]) -> Vec<String> {
        self.combinations
            .iter()
            .map(|combo| {
                let mut parts: Vec<String> = Vec::new();
                let mut i = 0;
                while i < combo.len() {
                    let idx = combo[i];
                    let power = combo[i..].iter().take_while(|&&c| c == idx).count();
                    let name = input.get(idx).cloned().unwrap_or_else(|| format!("x{idx}"));
                    parts.push(if power == 1 {
                        name
                    } else {
                        format!("{name}^{power}")
                    });
                    i += power;
                }
                parts.join(" ")
            })
            .collect()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features_in {
            return Err(RegressionError::InvalidData(format!(
                "polynomial expansion expects {} columns, got {}",
                self.n_features_in,
                x.ncols()
            )));
        }

        let mut out = Array2::<f64>::zeros((x.nrows(), self.combinations.len()));
        for (row_in, mut row_out) in x.rows().into_iter().zip(out.rows_mut()) {
            for (col, combo) in self.combinations.iter().enumerate() {
                row_out[col] = combo.iter().map(|&i| row_in[i]).product();
            }
        }
        Ok(out)
    }
}

/// Non-decreasing index tuples of length `remaining + current.len()`.
fn push_combinations(
    n: usize,
    remaining: usize,
    start: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if remaining == 0 {
        out.push(current.clone());
        return;
    }
    for i in start..n {
        current.push(i);
        push_combinations(n, remaining - 1, i, current, out);
        current.pop();
    }
}
