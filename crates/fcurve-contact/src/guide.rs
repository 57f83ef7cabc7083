//! The mechanics-model capability consumed by contact estimation
//!
//! The automatic estimators never know which contact-mechanics model they
//! serve. The model injects two capabilities: [`ContactEstimationGuide`]
//! bounds the plausible index range for the true contact point, and its
//! [`SequentialSearchAssistant`] evaluates a two-sided regression objective
//! at a trial split index. Clamping the search window to the guide's valid
//! range is part of the estimator contract; it is how instrument- or
//! model-specific constraints reach the search without coupling this crate
//! to the mechanics layer.

use fcurve_core::IndexRange;
use fcurve_regression::{FitModel, RegressionStrategy};

/// Evaluates the split objective for trial contact indices.
///
/// Branches are scored in canonical orientation: x ascending, the
/// in-contact region at low x and the free baseline extending to high x.
/// The objective at split `j` is the sum of the objective-function minima
/// of the postcontact model over `[0, j)` and the precontact model over
/// `[j, n)`. Underdetermined sides contribute 0, so splits near either
/// array edge are scored by the determined side alone.
pub trait SequentialSearchAssistant {
    /// Model fitted to the low-force side of a trial split.
    fn precontact_model(&self) -> FitModel;

    /// Model fitted to the in-contact side of a trial split.
    fn postcontact_model(&self) -> FitModel;

    /// Two-sided objective for a split at index `split`.
    fn split_objective(
        &self,
        strategy: &dyn RegressionStrategy,
        xs: &[f64],
        ys: &[f64],
        split: usize,
    ) -> f64 {
        let n = xs.len();
        let split = split.min(n);
        let postcontact =
            strategy.objective_function_minimum_in(xs, ys, 0, split, self.postcontact_model());
        let precontact =
            strategy.objective_function_minimum_in(xs, ys, split, n, self.precontact_model());
        postcontact + precontact
    }
}

/// Bounds and scores trial contact points for one mechanics model.
pub trait ContactEstimationGuide {
    /// Plausible index bounds for the true contact point, given the branch
    /// length. Automatic estimators must clamp their search to this range.
    fn valid_index_range(&self, point_count: usize) -> IndexRange;

    /// The assistant evaluating this model's split objective.
    fn search_assistant(&self) -> &dyn SequentialSearchAssistant;
}

/// Default guide: polynomial models on both sides, unrestricted index range.
///
/// A line on the precontact side and a caller-chosen model on the contact
/// side; suitable when no mechanics model narrows the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentedModelGuide {
    precontact: FitModel,
    postcontact: FitModel,
    valid: Option<IndexRange>,
}

impl SegmentedModelGuide {
    pub fn new(precontact: FitModel, postcontact: FitModel) -> Self {
        Self {
            precontact,
            postcontact,
            valid: None,
        }
    }

    /// A line on both sides: the sharp-bend geometry.
    pub fn piecewise_linear() -> Self {
        Self::new(FitModel::line(), FitModel::line())
    }

    /// Restrict the plausible contact range.
    pub fn with_valid_range(mut self, valid: IndexRange) -> Self {
        self.valid = Some(valid);
        self
    }
}

impl SequentialSearchAssistant for SegmentedModelGuide {
    fn precontact_model(&self) -> FitModel {
        self.precontact
    }

    fn postcontact_model(&self) -> FitModel {
        self.postcontact
    }
}

impl ContactEstimationGuide for SegmentedModelGuide {
    fn valid_index_range(&self, point_count: usize) -> IndexRange {
        let full = IndexRange::new(0, point_count.saturating_sub(1));
        self.valid
            .and_then(|valid| valid.clamp_to_len(point_count))
            .unwrap_or(full)
    }

    fn search_assistant(&self) -> &dyn SequentialSearchAssistant {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcurve_regression::LeastSquares;

    // Canonical geometry: steep contact ramp at low x, flat baseline after
    fn bent_line(n: usize, bend: usize) -> (Vec<f64>, Vec<f64>) {
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| {
                if (x as usize) < bend {
                    1.0 + 2.0 * (bend as f64 - x)
                } else {
                    1.0
                }
            })
            .collect();
        (xs, ys)
    }

    #[test]
    fn test_split_objective_vanishes_at_true_bend() {
        let (xs, ys) = bent_line(40, 25);
        let guide = SegmentedModelGuide::piecewise_linear();
        let at_bend = guide.split_objective(&LeastSquares, &xs, &ys, 25);
        let off_bend = guide.split_objective(&LeastSquares, &xs, &ys, 15);
        assert!(at_bend < 1e-9);
        assert!(off_bend > at_bend + 1.0);
    }

    #[test]
    fn test_split_objective_edge_splits_are_finite() {
        let (xs, ys) = bent_line(40, 25);
        let guide = SegmentedModelGuide::piecewise_linear();
        for split in [0, 1, 39, 40] {
            let value = guide.split_objective(&LeastSquares, &xs, &ys, split);
            assert!(value.is_finite());
        }
    }

    #[test]
    fn test_valid_range_defaults_to_full_branch() {
        let guide = SegmentedModelGuide::piecewise_linear();
        assert_eq!(guide.valid_index_range(100), IndexRange::new(0, 99));
    }

    #[test]
    fn test_valid_range_is_clamped_to_branch_length() {
        let guide =
            SegmentedModelGuide::piecewise_linear().with_valid_range(IndexRange::new(10, 500));
        let range = guide.valid_index_range(50);
        assert_eq!(range, IndexRange::new(10, 49));
    }
}
