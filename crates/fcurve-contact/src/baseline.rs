//! Precontact baseline fit
//!
//! The robust flexible estimator and the event detectors need to know what
//! "no force" looks like before they can say where contact begins. The
//! baseline fit answers that: guess a contact point with the classical
//! estimator, keep only the free region beyond it (x extended to
//! `+inf`), and fit that region with an aggressively robust high-coverage
//! regression (coverage divisor 8, so the search may trim down to 1/8
//! coverage). The fit yields a baseline function and a robust noise scale;
//! points are then classified pre- or post-contact by comparing their
//! residual against `multiplier * noise`.

use crate::estimators::{ClassicalFlexibleEstimator, ContactEstimator};
use crate::guide::ContactEstimationGuide;
use crate::search::GoldenSectionSearch;
use fcurve_core::{Channel1DData, Error, Point2D, Result};
use fcurve_regression::{FittedFunction, HighCoverageTrimmed, RegressionStrategy};
use tracing::debug;

/// Coverage divisor for the baseline search; 1/8 minimal coverage.
const BASELINE_COVERAGE_DIVISOR: usize = 8;

/// Consistency factor turning a median absolute residual into a Gaussian
/// sigma estimate.
const MAD_TO_SIGMA: f64 = 1.482_602_218_505_602;

/// A fitted baseline with its robust noise scale.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineFit {
    function: FittedFunction,
    noise: f64,
    contact_guess: Point2D,
}

impl BaselineFit {
    /// Fit the free-region baseline of a branch in canonical orientation
    /// (x ascending, baseline at high x).
    pub fn estimate(
        branch: &Channel1DData,
        guide: &dyn ContactEstimationGuide,
        spring_constant: f64,
    ) -> Result<BaselineFit> {
        Self::estimate_seeded(branch, guide, spring_constant, 0x5EED)
    }

    /// As [`estimate`](Self::estimate) with an explicit RNG seed for the
    /// robust fit.
    pub fn estimate_seeded(
        branch: &Channel1DData,
        guide: &dyn ContactEstimationGuide,
        spring_constant: f64,
        seed: u64,
    ) -> Result<BaselineFit> {
        let classical = ClassicalFlexibleEstimator::new(GoldenSectionSearch::new());
        let contact_guess = classical.contact_point(branch, guide, spring_constant)?;

        let precontact = branch.restricted_to_domain(contact_guess.x, f64::INFINITY);
        let model = guide.search_assistant().precontact_model();
        if precontact.len() <= model.parameter_count() {
            return Err(Error::InsufficientData {
                expected: model.parameter_count() + 1,
                actual: precontact.len(),
            });
        }

        let strategy = HighCoverageTrimmed::squares(BASELINE_COVERAGE_DIVISOR).with_seed(seed);
        let fit = strategy.perform_regression(precontact.xs(), precontact.ys(), model)?;

        let mut absolute_residuals: Vec<f64> =
            fit.residuals().iter().map(|r| r.abs()).collect();
        let noise = MAD_TO_SIGMA * median_in_place(&mut absolute_residuals);
        debug!(
            contact_guess_x = contact_guess.x,
            noise, "baseline fitted"
        );

        Ok(BaselineFit {
            function: fit.into_function(),
            noise,
            contact_guess,
        })
    }

    pub fn function(&self) -> &FittedFunction {
        &self.function
    }

    /// Robust noise scale of the baseline residuals.
    pub fn noise(&self) -> f64 {
        self.noise
    }

    /// The classical initial contact guess the fit was anchored on.
    pub fn contact_guess(&self) -> Point2D {
        self.contact_guess
    }

    /// Whether a point lies within `multiplier * noise` of the baseline.
    pub fn is_low_force(&self, x: f64, y: f64, multiplier: f64) -> bool {
        (y - self.function.value(x)).abs() <= multiplier * self.noise
    }

    /// Classify every point of a branch as low-force (precontact) or not.
    pub fn classify(&self, xs: &[f64], ys: &[f64], multiplier: f64) -> Vec<bool> {
        xs.iter()
            .zip(ys.iter())
            .map(|(&x, &y)| self.is_low_force(x, y, multiplier))
            .collect()
    }

    /// Partition branch indices into `(precontact, postcontact)` sets by
    /// residual against `multiplier * noise`.
    pub fn partition(&self, xs: &[f64], ys: &[f64], multiplier: f64) -> (Vec<usize>, Vec<usize>) {
        let mut precontact = Vec::new();
        let mut postcontact = Vec::new();
        for (i, flag) in self.classify(xs, ys, multiplier).into_iter().enumerate() {
            if flag {
                precontact.push(i);
            } else {
                postcontact.push(i);
            }
        }
        (precontact, postcontact)
    }
}

/// Median of a scratch buffer. Empty input yields NaN.
pub(crate) fn median_in_place(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }
    values.sort_by(f64::total_cmp);
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}
