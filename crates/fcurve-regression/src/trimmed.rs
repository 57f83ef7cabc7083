//! Least trimmed squares / least trimmed absolute values
//!
//! Robust regression by trimming: minimize the sum of the smallest h
//! per-point penalties (squared or absolute residuals), so up to `n - h`
//! gross outliers cannot influence the fit. The minimum is searched by a
//! seeded randomized multi-start: each start fits an elemental subset, then
//! concentration steps alternate "keep the h best points" with a refit on
//! the kept points until the objective stops falling. The global best over
//! all starts wins.
//!
//! The high-coverage variant additionally searches over coverage counts from
//! full n down to n / k and prefers the largest coverage whose mean covered
//! penalty stays competitive; it is the workhorse of baseline noise
//! estimation.

use crate::design;
use crate::function::{FitModel, FittedFunction};
use crate::lad::LeastAbsoluteDeviations;
use crate::traits::{RegressionFit, RegressionStrategy};
use fcurve_core::{Error, Result};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-point penalty of a trimmed objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrimmedObjective {
    /// Squared residuals (LTS)
    Squares,
    /// Absolute residuals (LTA)
    Absolute,
}

impl TrimmedObjective {
    fn penalty(&self, residual: f64) -> f64 {
        match self {
            TrimmedObjective::Squares => residual * residual,
            TrimmedObjective::Absolute => residual.abs(),
        }
    }
}

const CONCENTRATION_LIMIT: usize = 30;

/// Trimmed regression strategy (LTS or LTA by choice of objective).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimmedRegression {
    objective: TrimmedObjective,
    coverage: f64,
    starts: usize,
    seed: u64,
}

impl TrimmedRegression {
    /// Least trimmed squares with default coverage 0.5 and 200 starts.
    pub fn squares() -> Self {
        Self {
            objective: TrimmedObjective::Squares,
            coverage: 0.5,
            starts: 200,
            seed: 0x5EED,
        }
    }

    /// Least trimmed absolute values with default coverage 0.5 and 200 starts.
    pub fn absolute() -> Self {
        Self {
            objective: TrimmedObjective::Absolute,
            coverage: 0.5,
            starts: 200,
            seed: 0x5EED,
        }
    }

    /// Minimal coverage fraction of n that must survive trimming.
    pub fn with_coverage(mut self, coverage: f64) -> Result<Self> {
        if !(0.0 < coverage && coverage <= 1.0) {
            return Err(Error::InvalidParameter(format!(
                "coverage fraction must lie in (0, 1], got {coverage}"
            )));
        }
        self.coverage = coverage;
        Ok(self)
    }

    pub fn with_starts(mut self, starts: usize) -> Self {
        self.starts = starts.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn objective(&self) -> TrimmedObjective {
        self.objective
    }

    /// Covered point count for n points and p parameters.
    fn coverage_count(&self, n: usize, p: usize) -> usize {
        let h = (self.coverage * n as f64).ceil() as usize;
        h.max(p + 1).min(n)
    }

    fn search(
        &self,
        xs: &[f64],
        ys: &[f64],
        model: FitModel,
        h: usize,
    ) -> Result<RegressionFit> {
        search_trimmed(
            xs,
            ys,
            model,
            self.objective,
            h,
            self.starts,
            self.seed,
            None,
        )
    }
}

impl RegressionStrategy for TrimmedRegression {
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
        let h = self.coverage_count(xs.len(), model.parameter_count());
        self.search(xs, ys, model, h)
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
        let mut penalties: Vec<f64> = function
            .residuals(xs, ys)
            .iter()
            .map(|&r| self.objective.penalty(r))
            .collect();
        let h = self.coverage_count(xs.len(), 0);
        penalties.sort_by(f64::total_cmp);
        penalties.iter().take(h).sum()
    }
}

/// High-coverage trimmed regression.
///
/// Runs the trimmed search at a ladder of coverage counts between n and
/// n / `divisor`. A rung's own objective minimum is not comparable across
/// rungs (each refits on its covered subset), so rungs are judged on common
/// ground: every rung's fitted function is scored by the trimmed objective
/// at one majority coverage over the full range, normalized into a Gaussian
/// scale estimate. The largest coverage whose score stays within a small
/// slack of the best wins. Aggressive divisors (the baseline fit uses 8)
/// let the search survive heavy contamination while clean data still keeps
/// full coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighCoverageTrimmed {
    objective: TrimmedObjective,
    divisor: usize,
    starts: usize,
    seed: u64,
    slack: f64,
}

impl HighCoverageTrimmed {
    pub fn squares(divisor: usize) -> Self {
        Self {
            objective: TrimmedObjective::Squares,
            divisor: divisor.max(1),
            starts: 300,
            seed: 0x5EED,
            slack: 2.0,
        }
    }

    pub fn absolute(divisor: usize) -> Self {
        Self {
            objective: TrimmedObjective::Absolute,
            divisor: divisor.max(1),
            starts: 300,
            seed: 0x5EED,
            slack: 2.0,
        }
    }

    /// Start the coverage ladder from this fraction instead of 1 / divisor.
    pub fn with_initial_coverage(self, fraction: f64) -> Result<Self> {
        if !(0.0 < fraction && fraction <= 1.0) {
            return Err(Error::InvalidParameter(format!(
                "coverage fraction must lie in (0, 1], got {fraction}"
            )));
        }
        let divisor = (1.0 / fraction).round().max(1.0) as usize;
        Ok(Self { divisor, ..self })
    }

    pub fn with_starts(mut self, starts: usize) -> Self {
        self.starts = starts.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl RegressionStrategy for HighCoverageTrimmed {
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
        let n = xs.len();
        let p = model.parameter_count();
        if n <= p {
            return Err(Error::InsufficientData {
                expected: p + 1,
                actual: n,
            });
        }

        let h_min = (n / self.divisor).max(p + 1).min(n);
        // One rung per divisor step keeps the ladder short on long curves.
        let rungs = self.divisor.min(n - h_min + 1).max(1);
        let mut candidates: Vec<(usize, RegressionFit)> = Vec::with_capacity(rungs);
        for rung in 0..rungs {
            let h = if rungs == 1 {
                n
            } else {
                h_min + (n - h_min) * rung / (rungs - 1)
            };
            let fit = search_trimmed(xs, ys, model, self.objective, h, self.starts, self.seed, None)?;
            candidates.push((h, fit));
        }

        // Objective minima are refit at different coverages and are not
        // comparable across rungs; every rung's function is judged at one
        // common majority coverage over the full range.
        let h_common = (n / 2).max(p + 1).min(n);
        let factor = consistency_factor(self.objective, h_common as f64 / n as f64);
        let score = |fit: &RegressionFit| {
            let mut penalties: Vec<f64> = fit
                .function()
                .residuals(xs, ys)
                .iter()
                .map(|&r| self.objective.penalty(r))
                .collect();
            penalties.sort_by(f64::total_cmp);
            let sum: f64 = penalties.iter().take(h_common).sum();
            (sum / h_common as f64) / factor
        };
        let scores: Vec<f64> = candidates.iter().map(|(_, fit)| score(fit)).collect();
        let best_score = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let chosen = candidates
            .into_iter()
            .zip(scores)
            .filter(|((_, _), s)| *s <= self.slack * best_score)
            .max_by_key(|((h, _), _)| *h)
            .map(|((_, fit), _)| fit)
            .ok_or_else(|| Error::Computation("high-coverage search found no fit".to_string()))?;
        debug!(
            covered = chosen.covered().map_or(0, <[usize]>::len),
            total = n,
            objective = chosen.objective_minimum(),
            "high-coverage trimmed fit selected"
        );
        Ok(chosen)
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
        // Scored at the minimal coverage of the ladder
        let n = xs.len();
        let h = (n / self.divisor).max(1).min(n);
        let mut penalties: Vec<f64> = function
            .residuals(xs, ys)
            .iter()
            .map(|&r| self.objective.penalty(r))
            .collect();
        penalties.sort_by(f64::total_cmp);
        penalties.iter().take(h).sum()
    }
}

/// Gaussian consistency factor: the expected mean penalty of the smallest
/// `alpha`-fraction of residuals under unit-variance noise. Dividing a
/// rung's mean penalty by this factor turns it into a comparable scale
/// estimate.
fn consistency_factor(objective: TrimmedObjective, alpha: f64) -> f64 {
    let alpha = alpha.clamp(1e-3, 1.0);
    let normal = match Normal::new(0.0, 1.0) {
        Ok(normal) => normal,
        // Unit-normal construction cannot fail; score unscaled if it does.
        Err(_) => return 1.0,
    };
    let q = normal.inverse_cdf(((1.0 + alpha) / 2.0).min(1.0 - 1e-12));
    let factor = match objective {
        TrimmedObjective::Squares => (alpha - 2.0 * q * normal.pdf(q)) / alpha,
        TrimmedObjective::Absolute => 2.0 * (normal.pdf(0.0) - normal.pdf(q)) / alpha,
    };
    factor.max(1e-9)
}

/// One multi-start trimmed search at a fixed coverage count.
///
/// `support`, when given, lists indices that must stay covered in every
/// candidate subset (used by the supported postcontact strategy); `h` counts
/// the *total* covered points including the support.
#[allow(clippy::too_many_arguments)]
pub(crate) fn search_trimmed(
    xs: &[f64],
    ys: &[f64],
    model: FitModel,
    objective: TrimmedObjective,
    h: usize,
    starts: usize,
    seed: u64,
    support: Option<&[usize]>,
) -> Result<RegressionFit> {
    let n = xs.len();
    let p = model.parameter_count();
    if n <= p {
        return Err(Error::InsufficientData {
            expected: p + 1,
            actual: n,
        });
    }
    let support_len = support.map_or(0, <[usize]>::len);
    let h = h.clamp((p + 1).max(support_len), n);

    // Draw all elemental subsets up front so parallel refinement stays
    // deterministic for a fixed seed.
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let subset_len = (p + 1).min(n);
    let subsets: Vec<Vec<usize>> = (0..starts)
        .map(|_| {
            let mut indices: Vec<usize> = sample(&mut rng, n, subset_len).into_vec();
            if let Some(support) = support {
                for &s in support {
                    if !indices.contains(&s) {
                        indices.push(s);
                    }
                }
            }
            indices
        })
        .collect();

    let refine = |subset: &Vec<usize>| -> Option<(f64, Vec<usize>, FittedFunction)> {
        refine_start(xs, ys, model, objective, h, support, subset).ok()
    };

    #[cfg(feature = "parallel")]
    let best = subsets
        .par_iter()
        .filter_map(refine)
        .min_by(|a, b| a.0.total_cmp(&b.0));
    #[cfg(not(feature = "parallel"))]
    let best = subsets
        .iter()
        .filter_map(refine)
        .min_by(|a, b| a.0.total_cmp(&b.0));

    let (objective_minimum, mut covered, function) = best.ok_or_else(|| {
        Error::Computation("every trimmed start failed to produce a fit".to_string())
    })?;
    covered.sort_unstable();
    debug!(
        starts,
        h, objective_minimum, "trimmed multi-start search finished"
    );
    let residuals = function.residuals(xs, ys);
    Ok(RegressionFit::new(
        function,
        objective_minimum,
        residuals,
        Some(covered),
    ))
}

/// Fit one elemental subset and run concentration steps to a local optimum.
fn refine_start(
    xs: &[f64],
    ys: &[f64],
    model: FitModel,
    objective: TrimmedObjective,
    h: usize,
    support: Option<&[usize]>,
    subset: &[usize],
) -> Result<(f64, Vec<usize>, FittedFunction)> {
    let mut function = design::solve_weighted(xs, ys, model, Some(subset), None)?;
    let mut best_objective = f64::INFINITY;
    let mut covered: Vec<usize> = Vec::new();

    for _ in 0..CONCENTRATION_LIMIT {
        let candidate_covered = smallest_penalties(xs, ys, &function, objective, h, support);
        let candidate_objective: f64 = candidate_covered
            .iter()
            .map(|&i| objective.penalty(ys[i] - function.value(xs[i])))
            .sum();
        if !(candidate_objective < best_objective) {
            break;
        }
        best_objective = candidate_objective;
        covered = candidate_covered;
        function = refit_on(xs, ys, model, objective, &covered)?;
    }

    if covered.is_empty() {
        return Err(Error::Computation(
            "concentration failed to cover any points".to_string(),
        ));
    }
    // Final objective belongs to the final refit
    let final_objective: f64 = covered
        .iter()
        .map(|&i| objective.penalty(ys[i] - function.value(xs[i])))
        .sum();
    let objective_minimum = final_objective.min(best_objective);
    Ok((objective_minimum, covered, function))
}

/// Indices of the h smallest penalties, always retaining the support.
fn smallest_penalties(
    xs: &[f64],
    ys: &[f64],
    function: &FittedFunction,
    objective: TrimmedObjective,
    h: usize,
    support: Option<&[usize]>,
) -> Vec<usize> {
    let is_support = |i: usize| support.is_some_and(|s| s.contains(&i));
    let mut free: Vec<(usize, f64)> = (0..xs.len())
        .filter(|&i| !is_support(i))
        .map(|i| (i, objective.penalty(ys[i] - function.value(xs[i]))))
        .collect();
    free.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut covered: Vec<usize> = support.map(<[usize]>::to_vec).unwrap_or_default();
    let want = h.saturating_sub(covered.len());
    covered.extend(free.iter().take(want).map(|&(i, _)| i));
    covered
}

/// Refit on the covered subset: L2 for the squares objective, LAD for the
/// absolute objective.
fn refit_on(
    xs: &[f64],
    ys: &[f64],
    model: FitModel,
    objective: TrimmedObjective,
    covered: &[usize],
) -> Result<FittedFunction> {
    match objective {
        TrimmedObjective::Squares => design::solve_weighted(xs, ys, model, Some(covered), None),
        TrimmedObjective::Absolute => {
            let sub_xs: Vec<f64> = covered.iter().map(|&i| xs[i]).collect();
            let sub_ys: Vec<f64> = covered.iter().map(|&i| ys[i]).collect();
            LeastAbsoluteDeviations::new().fit_function(&sub_xs, &sub_ys, model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::ols::LeastSquares;
    use rand::Rng;

    /// Linear trend with a fifth of the points grossly off.
    fn contaminated_line(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let noise: f64 = rng.gen_range(-0.05..0.05);
                if i % 5 == 0 {
                    3.0 + 0.5 * x + 40.0 + noise
                } else {
                    3.0 + 0.5 * x + noise
                }
            })
            .collect();
        (xs, ys)
    }

    #[test]
    fn test_lts_recovers_trend_under_contamination() {
        let (xs, ys) = contaminated_line(60, 7);
        let lts = TrimmedRegression::squares().with_starts(150);
        let fit = lts.perform_regression(&xs, &ys, FitModel::line()).unwrap();
        let f = fit.function();
        let slope = (f.value(50.0) - f.value(0.0)) / 50.0;
        assert_relative_eq!(slope, 0.5, epsilon = 0.02);
        assert_relative_eq!(f.value(0.0), 3.0, epsilon = 0.5);

        // L2 on the same data is visibly biased upward by the outliers
        let l2 = LeastSquares
            .fit_function(&xs, &ys, FitModel::line())
            .unwrap();
        assert!((l2.value(0.0) - 3.0).abs() > 2.0);
    }

    #[test]
    fn test_lta_recovers_trend_under_contamination() {
        let (xs, ys) = contaminated_line(50, 11);
        let lta = TrimmedRegression::absolute().with_starts(100);
        let f = lta.fit_function(&xs, &ys, FitModel::line()).unwrap();
        let slope = (f.value(40.0) - f.value(0.0)) / 40.0;
        assert_relative_eq!(slope, 0.5, epsilon = 0.05);
    }

    #[test]
    fn test_covered_subset_excludes_outliers() {
        let (xs, ys) = contaminated_line(40, 3);
        let lts = TrimmedRegression::squares().with_starts(100);
        let fit = lts.perform_regression(&xs, &ys, FitModel::line()).unwrap();
        let covered = fit.covered().expect("trimmed fits report coverage");
        // None of the contaminated indices (multiples of 5) should survive
        for &i in covered {
            assert_ne!(i % 5, 0, "outlier index {i} was covered");
        }
    }

    #[test]
    fn test_determinism_for_fixed_seed() {
        let (xs, ys) = contaminated_line(40, 5);
        let lts = TrimmedRegression::squares().with_starts(50).with_seed(42);
        let a = lts.perform_regression(&xs, &ys, FitModel::line()).unwrap();
        let b = lts.perform_regression(&xs, &ys, FitModel::line()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_input_returns_zero_minimum() {
        let lts = TrimmedRegression::squares();
        assert_eq!(
            lts.objective_function_minimum(&[1.0, 2.0], &[1.0, 2.0], FitModel::line()),
            0.0
        );
        assert_eq!(
            lts.objective_function_minimum(&[], &[], FitModel::line()),
            0.0
        );
    }

    #[test]
    fn test_high_coverage_prefers_full_coverage_on_clean_data() {
        let xs: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| 1.0 + 0.1 * x + rng.gen_range(-0.01..0.01))
            .collect();
        let fit = HighCoverageTrimmed::squares(8)
            .with_starts(60)
            .perform_regression(&xs, &ys, FitModel::line())
            .unwrap();
        let covered = fit.covered().unwrap().len();
        assert!(covered >= 36, "expected near-full coverage, got {covered}");
    }

    #[test]
    fn test_high_coverage_survives_heavy_contamination() {
        // The last third leaves the trend and rises steeply
        let xs: Vec<f64> = (0..60).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| {
                if x < 40.0 {
                    0.5 * x
                } else {
                    0.5 * 40.0 + 8.0 * (x - 40.0)
                }
            })
            .collect();
        let fit = HighCoverageTrimmed::squares(8)
            .with_starts(150)
            .perform_regression(&xs, &ys, FitModel::line())
            .unwrap();
        let f = fit.function();
        let slope = (f.value(39.0) - f.value(0.0)) / 39.0;
        assert_relative_eq!(slope, 0.5, epsilon = 0.1);
        // The fit follows the trend, not the steep minority, and keeps
        // most of the trend covered
        assert!(fit.covered().unwrap().len() >= 30);
    }

    #[test]
    fn test_objective_function_value_trims_external_function() {
        let lts = TrimmedRegression::squares();
        let f = FittedFunction::Polynomial {
            coefficients: vec![0.0],
        };
        // Penalties 1, 1, 10000; coverage 0.5 of 3 -> h = max(1, 2) = 2
        let value = lts.objective_function_value(&f, &[0.0, 1.0, 2.0], &[1.0, -1.0, 100.0]);
        assert_relative_eq!(value, 2.0, epsilon = 1e-12);
    }
}
