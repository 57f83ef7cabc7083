//! Contact-point estimator strategies
//!
//! Pure strategy objects sharing one contract: given a branch in canonical
//! orientation (x ascending, in-contact region at low x, free baseline at
//! high x), return the contact point. Manual and nearest-value estimators
//! just look points up; the flexible estimators search for the split index
//! minimizing a two-sided regression objective supplied by the mechanics
//! guide. Automatic estimators clamp their search window to the guide's
//! valid index range; skipping that clamp silently discards
//! instrument-specific constraints.

use crate::baseline::BaselineFit;
use crate::guide::ContactEstimationGuide;
use crate::search::MinimumSearchStrategy;
use fcurve_core::{BaseUnit, Channel1DData, Error, Point2D, Result, Unit};
use fcurve_regression::{
    LeastSquares, RegressionStrategy, SupportedPostcontactFit, TrimmedObjective,
};
use tracing::debug;

/// Fraction of points excluded from each flexible search at the low-x edge.
const EDGE_FRACTION: f64 = 0.075;

/// Points excluded from each flexible search at the high-x edge.
const EDGE_POINTS: usize = 5;

/// A contact-point estimation strategy.
pub trait ContactEstimator {
    /// The contact point of a branch in canonical orientation.
    fn contact_point(
        &self,
        branch: &Channel1DData,
        guide: &dyn ContactEstimationGuide,
        spring_constant: f64,
    ) -> Result<Point2D>;

    /// Whether this estimator finds the contact point itself rather than
    /// reading it from user-supplied input.
    fn is_automatic(&self) -> bool;
}

/// Returns a fixed, user-picked point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualContactEstimator {
    point: Point2D,
}

impl ManualContactEstimator {
    pub fn new(point: Point2D) -> Self {
        Self { point }
    }
}

impl ContactEstimator for ManualContactEstimator {
    fn contact_point(
        &self,
        _branch: &Channel1DData,
        _guide: &dyn ContactEstimationGuide,
        _spring_constant: f64,
    ) -> Result<Point2D> {
        Ok(self.point)
    }

    fn is_automatic(&self) -> bool {
        false
    }
}

/// Locates the branch point whose abscissa is closest to a user-specified
/// physical value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestAbscissaEstimator {
    value: f64,
    unit: Unit,
}

impl NearestAbscissaEstimator {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }
}

impl ContactEstimator for NearestAbscissaEstimator {
    fn contact_point(
        &self,
        branch: &Channel1DData,
        _guide: &dyn ContactEstimationGuide,
        _spring_constant: f64,
    ) -> Result<Point2D> {
        let factor = self.unit.conversion_factor_to(branch.x_quantity().unit())?;
        let index = branch
            .index_of_nearest_x(self.value * factor)
            .ok_or_else(Error::empty_input)?;
        Ok(branch.point(index))
    }

    fn is_automatic(&self) -> bool {
        false
    }
}

/// Locates the branch point whose ordinate is closest to a user-specified
/// physical value.
///
/// A force target against a deflection-valued branch is converted through
/// the cantilever spring constant (N/m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestOrdinateEstimator {
    value: f64,
    unit: Unit,
}

impl NearestOrdinateEstimator {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    fn target_in_branch_units(&self, branch: &Channel1DData, spring_constant: f64) -> Result<f64> {
        let branch_unit = *branch.y_quantity().unit();
        if self.unit.base == branch_unit.base {
            return Ok(self.value * self.unit.conversion_factor_to(&branch_unit)?);
        }
        if self.unit.base == BaseUnit::Newton && branch_unit.base == BaseUnit::Meter {
            if !(spring_constant > 0.0) {
                return Err(Error::non_positive("spring constant", spring_constant));
            }
            let newtons = self.value * self.unit.conversion_factor_to(&Unit::base(BaseUnit::Newton))?;
            let metres = newtons / spring_constant;
            return Ok(metres * Unit::base(BaseUnit::Meter).conversion_factor_to(&branch_unit)?);
        }
        Err(Error::incompatible_units(
            self.unit.base.symbol(),
            branch_unit.base.symbol(),
        ))
    }
}

impl ContactEstimator for NearestOrdinateEstimator {
    fn contact_point(
        &self,
        branch: &Channel1DData,
        _guide: &dyn ContactEstimationGuide,
        spring_constant: f64,
    ) -> Result<Point2D> {
        let target = self.target_in_branch_units(branch, spring_constant)?;
        let index = branch
            .index_of_nearest_y(target)
            .ok_or_else(Error::empty_input)?;
        Ok(branch.point(index))
    }

    fn is_automatic(&self) -> bool {
        false
    }
}

/// Search window `[lo, hi]` for a flexible estimator, clamped to the guide
/// range and the edge margins.
fn search_window(
    n: usize,
    guide: &dyn ContactEstimationGuide,
    extra_lower_bound: usize,
) -> Result<(usize, usize)> {
    let valid = guide.valid_index_range(n);
    let lo = ((EDGE_FRACTION * n as f64).ceil() as usize)
        .max(extra_lower_bound)
        .max(valid.min());
    let hi = n.saturating_sub(EDGE_POINTS).min(valid.max());
    if lo > hi {
        return Err(Error::InsufficientData {
            expected: 2 * EDGE_POINTS + extra_lower_bound,
            actual: n,
        });
    }
    Ok((lo, hi))
}

/// Splits the branch where a two-sided ordinary least squares objective is
/// minimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassicalFlexibleEstimator<S> {
    search: S,
}

impl<S: MinimumSearchStrategy> ClassicalFlexibleEstimator<S> {
    pub fn new(search: S) -> Self {
        Self { search }
    }
}

impl<S: MinimumSearchStrategy> ContactEstimator for ClassicalFlexibleEstimator<S> {
    fn contact_point(
        &self,
        branch: &Channel1DData,
        guide: &dyn ContactEstimationGuide,
        _spring_constant: f64,
    ) -> Result<Point2D> {
        let n = branch.len();
        let (lo, hi) = search_window(n, guide, 0)?;
        let assistant = guide.search_assistant();
        let xs = branch.xs();
        let ys = branch.ys();

        let mut objective = |index: f64| {
            let split = (index.round() as usize).min(n);
            assistant.split_objective(&LeastSquares, xs, ys, split)
        };
        let best = self
            .search
            .minimum(&mut objective, lo as f64, hi as f64)
            .round() as usize;
        let best = best.clamp(lo, hi);
        debug!(contact_index = best, "classical flexible estimate");
        Ok(branch.point(best))
    }

    fn is_automatic(&self) -> bool {
        true
    }
}

/// Splits the branch using a baseline-informed robust objective.
///
/// A full baseline fit first estimates the branch noise and classifies
/// points as low- or high-force. Each trial split is then scored with the
/// precontact model on the free side and a supported trimmed fit on the
/// in-contact side, with the postcontact points ordered outward from the
/// trial contact so the adjacent low-force run forms the mandatory support
/// prefix. Slower than the classical estimator but far less sensitive to
/// noise bursts near the putative contact point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobustFlexibleEstimator<S> {
    search: S,
    objective: TrimmedObjective,
    noise_multiplier: f64,
    starts: usize,
    seed: u64,
}

impl<S: MinimumSearchStrategy> RobustFlexibleEstimator<S> {
    pub fn new(search: S) -> Self {
        Self {
            search,
            objective: TrimmedObjective::Squares,
            noise_multiplier: 3.0,
            starts: 50,
            seed: 0x5EED,
        }
    }

    pub fn with_objective(mut self, objective: TrimmedObjective) -> Self {
        self.objective = objective;
        self
    }

    /// Residual multiplier separating low-force from in-contact points.
    pub fn with_noise_multiplier(mut self, multiplier: f64) -> Result<Self> {
        if !(multiplier > 0.0) {
            return Err(Error::non_positive("noise multiplier", multiplier));
        }
        self.noise_multiplier = multiplier;
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
}

impl<S: MinimumSearchStrategy> ContactEstimator for RobustFlexibleEstimator<S> {
    fn contact_point(
        &self,
        branch: &Channel1DData,
        guide: &dyn ContactEstimationGuide,
        spring_constant: f64,
    ) -> Result<Point2D> {
        let n = branch.len();
        let assistant = guide.search_assistant();
        let precontact_model = assistant.precontact_model();
        let postcontact_model = assistant.postcontact_model();
        let (lo, hi) = search_window(n, guide, postcontact_model.parameter_count() + 1)?;

        let baseline = BaselineFit::estimate_seeded(branch, guide, spring_constant, self.seed)?;
        let xs = branch.xs();
        let ys = branch.ys();
        let low_force = baseline.classify(xs, ys, self.noise_multiplier);

        // run[i] = length of the contiguous low-force run ending at i
        let mut run = vec![0usize; n];
        for i in 0..n {
            if low_force[i] {
                run[i] = if i == 0 { 1 } else { run[i - 1] + 1 };
            }
        }

        let mut objective = |index: f64| {
            let split = (index.round() as usize).min(n);
            let precontact =
                LeastSquares.objective_function_minimum_in(xs, ys, split, n, precontact_model);

            // In-contact side, ordered outward from the trial contact; the
            // low-force run adjacent to the split is the support prefix.
            let support_len = if split == 0 { 0 } else { run[split - 1] };
            let xs_outward: Vec<f64> = xs[..split].iter().rev().copied().collect();
            let ys_outward: Vec<f64> = ys[..split].iter().rev().copied().collect();
            let supported = SupportedPostcontactFit::new(self.objective, support_len)
                .with_starts(self.starts)
                .with_seed(self.seed);
            let postcontact = supported.objective_function_minimum_in(
                &xs_outward,
                &ys_outward,
                0,
                split,
                postcontact_model,
            );
            precontact + postcontact
        };
        let best = self
            .search
            .minimum(&mut objective, lo as f64, hi as f64)
            .round() as usize;
        let best = best.clamp(lo, hi);
        debug!(
            contact_index = best,
            noise = baseline.noise(),
            "robust flexible estimate"
        );
        Ok(branch.point(best))
    }

    fn is_automatic(&self) -> bool {
        true
    }
}
