//! The regression-strategy contract
//!
//! Every objective function in the closed family (L2, L1, LTS, LTA and the
//! high-coverage variants) implements [`RegressionStrategy`]: fit a
//! [`FitModel`] to data (full or `[from, to)` sub-range), report the
//! objective-function minimum, and score an externally supplied function.
//!
//! Shared boundary policy: when the (sub-)range holds no more points than
//! the model has parameters, the objective minimum is 0; an underdetermined
//! fit contributes no penalty and is never an error. Strategies that trim
//! also report which points their best fit covered.

use crate::function::{FitModel, FittedFunction};
use fcurve_core::{Point2D, Result};

/// Result of one regression: the fitted function, its objective minimum,
/// residuals over the fitted range, and (for robust strategies) the covered
/// subset.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionFit {
    function: FittedFunction,
    objective_minimum: f64,
    residuals: Vec<f64>,
    /// Indices (into the fitted range) the robust objective covered;
    /// `None` means every point was covered.
    covered: Option<Vec<usize>>,
}

impl RegressionFit {
    pub fn new(
        function: FittedFunction,
        objective_minimum: f64,
        residuals: Vec<f64>,
        covered: Option<Vec<usize>>,
    ) -> Self {
        Self {
            function,
            objective_minimum,
            residuals,
            covered,
        }
    }

    pub fn function(&self) -> &FittedFunction {
        &self.function
    }

    pub fn into_function(self) -> FittedFunction {
        self.function
    }

    pub fn objective_minimum(&self) -> f64 {
        self.objective_minimum
    }

    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    pub fn covered(&self) -> Option<&[usize]> {
        self.covered.as_deref()
    }

    /// Covered x values, in covered order.
    pub fn covered_xs(&self, xs: &[f64]) -> Vec<f64> {
        match &self.covered {
            Some(indices) => indices.iter().map(|&i| xs[i]).collect(),
            None => xs.to_vec(),
        }
    }

    /// The rightmost (largest-x) point the fit covered.
    pub fn last_covered_point(&self, xs: &[f64], ys: &[f64]) -> Option<Point2D> {
        let best = match &self.covered {
            Some(indices) => indices
                .iter()
                .copied()
                .max_by(|&a, &b| xs[a].total_cmp(&xs[b]))?,
            None => (0..xs.len()).max_by(|&a, &b| xs[a].total_cmp(&xs[b]))?,
        };
        Some(Point2D::new(xs[best], ys[best]))
    }
}

/// A member of the closed regression-strategy family.
pub trait RegressionStrategy {
    /// Fit `model` to the points in `[from, to)`.
    ///
    /// Errors on underdetermined ranges; use
    /// [`objective_function_minimum_in`](Self::objective_function_minimum_in)
    /// when a neutral value is wanted instead.
    fn perform_regression_in(
        &self,
        xs: &[f64],
        ys: &[f64],
        from: usize,
        to: usize,
        model: FitModel,
    ) -> Result<RegressionFit>;

    /// Objective-function minimum over `[from, to)`; 0 for underdetermined
    /// ranges.
    fn objective_function_minimum_in(
        &self,
        xs: &[f64],
        ys: &[f64],
        from: usize,
        to: usize,
        model: FitModel,
    ) -> f64;

    /// Score an externally supplied function against data with this
    /// strategy's objective.
    fn objective_function_value(&self, function: &FittedFunction, xs: &[f64], ys: &[f64]) -> f64;

    /// Fit `model` to all points.
    fn perform_regression(&self, xs: &[f64], ys: &[f64], model: FitModel) -> Result<RegressionFit> {
        self.perform_regression_in(xs, ys, 0, xs.len(), model)
    }

    /// Objective-function minimum over all points; 0 when underdetermined.
    fn objective_function_minimum(&self, xs: &[f64], ys: &[f64], model: FitModel) -> f64 {
        self.objective_function_minimum_in(xs, ys, 0, xs.len(), model)
    }

    /// Fit and keep only the function.
    fn fit_function(&self, xs: &[f64], ys: &[f64], model: FitModel) -> Result<FittedFunction> {
        Ok(self.perform_regression(xs, ys, model)?.into_function())
    }
}
