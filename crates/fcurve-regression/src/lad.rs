//! Least absolute deviations (L1)
//!
//! Minimizes the sum of absolute residuals by iteratively reweighted least
//! squares: each round solves a weighted L2 problem with weights
//! `1 / max(|r_i|, eps)` and stops when the objective stops improving or the
//! iteration budget runs out. The eps floor keeps points lying exactly on
//! the current fit from blowing up the weights.

use crate::design;
use crate::function::{FitModel, FittedFunction};
use crate::traits::{RegressionFit, RegressionStrategy};
use fcurve_core::Result;

/// Least-absolute-deviations strategy via IRLS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeastAbsoluteDeviations {
    max_iterations: usize,
    tolerance: f64,
}

impl Default for LeastAbsoluteDeviations {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-10,
        }
    }
}

impl LeastAbsoluteDeviations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iterations(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }
}

fn absolute_sum(residuals: &[f64]) -> f64 {
    residuals.iter().map(|r| r.abs()).sum()
}

impl RegressionStrategy for LeastAbsoluteDeviations {
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

        // L2 start
        let mut function = design::solve(xs, ys, model)?;
        let mut residuals = function.residuals(xs, ys);
        let mut objective = absolute_sum(&residuals);

        let eps = 1e-8 * (objective / residuals.len().max(1) as f64).max(1e-30);
        let mut weights = vec![0.0; xs.len()];
        for _ in 0..self.max_iterations {
            for (w, r) in weights.iter_mut().zip(residuals.iter()) {
                *w = 1.0 / r.abs().max(eps);
            }
            let candidate = design::solve_weighted(xs, ys, model, None, Some(&weights))?;
            let candidate_residuals = candidate.residuals(xs, ys);
            let candidate_objective = absolute_sum(&candidate_residuals);
            if candidate_objective.is_finite() && candidate_objective < objective {
                let improvement = objective - candidate_objective;
                function = candidate;
                residuals = candidate_residuals;
                objective = candidate_objective;
                if improvement <= self.tolerance * objective.max(1.0) {
                    break;
                }
            } else {
                break;
            }
        }

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
        absolute_sum(&function.residuals(xs, ys))
    }
}
