//! Unspecific adhesion detection
//!
//! Finds the single dominant adhesion event of a withdraw branch without
//! assuming anything about its shape. The branch is sorted ascending in x
//! and its outer 7.5% of points are rejected on each side (edge artifacts
//! dominate there). From the minimum-force point onward a high-coverage
//! robust line fit separates the recovered baseline from the adhesion well:
//! the covered points cluster on the baseline, and the rightmost edge of
//! the largest contiguous covered cluster marks lift-off. The adhesion
//! force is the gap between the minimum-force point and the fitted
//! baseline at lift-off.

use crate::estimate::ForceEventEstimate;
use fcurve_core::{Channel1DData, Point2D, Result, SortedArrayOrder};
use fcurve_regression::{FitModel, HighCoverageTrimmed, RegressionStrategy};
use tracing::debug;

/// Fraction of points rejected at each edge of the withdraw branch.
const EDGE_TRIM: f64 = 0.075;

/// Coverage divisor of the baseline fit; initial coverage 1/4.
const COVERAGE_DIVISOR: usize = 4;

/// Covered-spacing multiplier that breaks clusters.
const CLUSTER_GAP_FACTOR: f64 = 3.0;

/// Detects the dominant adhesion event of a withdraw branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnspecificAdhesionEstimator {
    starts: usize,
    seed: u64,
}

impl Default for UnspecificAdhesionEstimator {
    fn default() -> Self {
        Self {
            starts: 300,
            seed: 0x5EED,
        }
    }
}

impl UnspecificAdhesionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_starts(mut self, starts: usize) -> Self {
        self.starts = starts.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Adhesion events of a withdraw branch, optionally restricted to an
    /// x domain. Empty or degenerate branches yield an empty list.
    pub fn events(
        &self,
        withdraw: &Channel1DData,
        domain: Option<(f64, f64)>,
    ) -> Result<Vec<ForceEventEstimate>> {
        if withdraw.is_empty() {
            return Ok(Vec::new());
        }
        let restricted = match domain {
            Some((xmin, xmax)) => withdraw.restricted_to_domain(xmin, xmax),
            None => withdraw.clone(),
        };
        let sorted = restricted.sorted_by_x(SortedArrayOrder::Ascending);
        let trimmed = sorted.trimmed(EDGE_TRIM, EDGE_TRIM);
        let n = trimmed.len();

        let Some(min_index) = trimmed.index_of_min_y_in(0, n) else {
            return Ok(Vec::new());
        };
        let minimum = trimmed.point(min_index);
        let xs = &trimmed.xs()[min_index..];
        let ys = &trimmed.ys()[min_index..];
        if xs.len() < 4 {
            return Ok(Vec::new());
        }

        let strategy = HighCoverageTrimmed::squares(COVERAGE_DIVISOR)
            .with_starts(self.starts)
            .with_seed(self.seed);
        let fit = strategy.perform_regression(xs, ys, FitModel::line())?;

        let mut covered_xs = fit.covered_xs(xs);
        covered_xs.sort_by(f64::total_cmp);
        let Some(lift_off_x) = rightmost_of_largest_cluster(&covered_xs) else {
            return Ok(Vec::new());
        };

        let baseline_at_lift_off = fit.function().value(lift_off_x);
        let end = Point2D::new(lift_off_x, baseline_at_lift_off);
        let event = ForceEventEstimate::new(minimum, end);
        debug!(
            lift_off_x,
            force = event.force(),
            "adhesion event estimated"
        );
        Ok(vec![event])
    }
}

/// Rightmost x of the largest contiguous cluster of sorted values, where
/// gaps wider than [`CLUSTER_GAP_FACTOR`] times the median spacing break
/// clusters.
fn rightmost_of_largest_cluster(sorted_xs: &[f64]) -> Option<f64> {
    if sorted_xs.is_empty() {
        return None;
    }
    if sorted_xs.len() == 1 {
        return Some(sorted_xs[0]);
    }
    let mut spacings: Vec<f64> = sorted_xs.windows(2).map(|w| w[1] - w[0]).collect();
    spacings.sort_by(f64::total_cmp);
    let median = if spacings.len() % 2 == 1 {
        spacings[spacings.len() / 2]
    } else {
        0.5 * (spacings[spacings.len() / 2 - 1] + spacings[spacings.len() / 2])
    };
    let threshold = CLUSTER_GAP_FACTOR * median;

    let mut best_start = 0;
    let mut best_len = 1;
    let mut start = 0;
    for i in 1..sorted_xs.len() {
        if sorted_xs[i] - sorted_xs[i - 1] > threshold {
            start = i;
        }
        let len = i - start + 1;
        if len > best_len {
            best_len = len;
            best_start = start;
        }
    }
    Some(sorted_xs[best_start + best_len - 1])
}
