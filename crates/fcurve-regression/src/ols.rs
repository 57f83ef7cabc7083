//! Ordinary least squares (L2)
//!
//! The classical closed-form estimator: normal equations solved by Cholesky
//! with an SVD fallback. Its objective minimum is the residual sum of
//! squares.

use crate::design;
use crate::function::{FitModel, FittedFunction};
use crate::traits::{RegressionFit, RegressionStrategy};
use fcurve_core::Result;

/// Ordinary least-squares strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquares;

impl LeastSquares {
    pub fn new() -> Self {
        Self
    }
}

impl RegressionStrategy for LeastSquares {
    fn perform_regression_in(
        &self,
        xs: &[f64],
        ys: &[f64],
        from: usize,
        to: usize,
        model: FitModel,
    ) -> Result<RegressionFit> {
        let xs = &xs[from..to];
        let ys = &ys[from..to];
        let function = design::solve(xs, ys, model)?;
        let residuals = function.residuals(xs, ys);
        let objective = residuals.iter().map(|r| r * r).sum();
        Ok(RegressionFit::new(function, objective, residuals, None))
    }

    fn objective_function_minimum_in(
        &self,
        xs: &[f64],
        ys: &[f64],
        from: usize,
        to: usize,
        model: FitModel,
    ) -> f64 {
        if to.saturating_sub(from) <= model.parameter_count() {
            return 0.0;
        }
        match self.perform_regression_in(xs, ys, from, to, model) {
            Ok(fit) => fit.objective_minimum(),
            Err(_) => 0.0,
        }
    }

    fn objective_function_value(&self, function: &FittedFunction, xs: &[f64], ys: &[f64]) -> f64 {
        function.residuals(xs, ys).iter().map(|r| r * r).sum()
    }
}
