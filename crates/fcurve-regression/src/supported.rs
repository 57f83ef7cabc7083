//! Supported postcontact fit
//!
//! A trimmed fit whose covered set is anchored: every point before
//! `support_end` is mandatorily covered, only the suffix beyond it may be
//! trimmed, at a fixed coverage fraction of 0.5. The robust flexible contact
//! estimator scores trial split indices with this strategy so the
//! postcontact fit cannot drift away from the known-good low-force points
//! while staying robust to outliers further out.
//!
//! This type deliberately exposes only the operations its one caller needs
//! (range-based objective minimum and the final regression); the external
//! function-scoring overloads of the general strategy trait have no
//! reachable call path here and therefore do not exist.

use crate::function::FitModel;
use crate::traits::RegressionFit;
use crate::trimmed::{search_trimmed, TrimmedObjective};
use fcurve_core::Result;

/// Coverage fraction applied to the optional suffix.
const SUFFIX_COVERAGE: f64 = 0.5;

/// Trimmed fit with a mandatory support prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportedPostcontactFit {
    objective: TrimmedObjective,
    /// Absolute index (into the full arrays) before which every point is
    /// mandatorily covered.
    support_end: usize,
    starts: usize,
    seed: u64,
}

impl SupportedPostcontactFit {
    pub fn new(objective: TrimmedObjective, support_end: usize) -> Self {
        Self {
            objective,
            support_end,
            starts: 50,
            seed: 0x5EED,
        }
    }

    pub fn with_starts(mut self, starts: usize) -> Self {
        self.starts = starts.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn support_end(&self) -> usize {
        self.support_end
    }

    /// Support indices and total coverage count for the range `[from, to)`.
    fn plan(&self, from: usize, to: usize, p: usize) -> (Vec<usize>, usize) {
        let n = to - from;
        let support_len = self.support_end.saturating_sub(from).min(n);
        let optional_len = n - support_len;
        let h = support_len + (SUFFIX_COVERAGE * optional_len as f64).ceil() as usize;
        let support: Vec<usize> = (0..support_len).collect();
        (support, h.clamp((p + 1).min(n), n))
    }

    /// Fit over `[from, to)` with the support prefix pinned.
    pub fn perform_regression_in(
        &self,
        xs: &[f64],
        ys: &[f64],
        from: usize,
        to: usize,
        model: FitModel,
    ) -> Result<RegressionFit> {
        let xs = &xs[from..to];
        let ys = &ys[from..to];
        let (support, h) = self.plan(from, to, model.parameter_count());
        search_trimmed(
            xs,
            ys,
            model,
            self.objective,
            h,
            self.starts,
            self.seed,
            Some(&support),
        )
    }

    /// Objective minimum over `[from, to)`; 0 for underdetermined ranges.
    pub fn objective_function_minimum_in(
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
}
