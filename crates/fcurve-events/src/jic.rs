//! Jump detection by penalized model-order selection
//!
//! The jump-information-criterion detector scores every point of a branch
//! by the gap between its left and right one-sided smooths, greedily
//! collects the highest-scoring candidates while masking each candidate's
//! `window / 2` neighborhood, and then asks how many of those candidates
//! are real: for each candidate-list prefix it flattens the signal by
//! subtracting the jump magnitudes, measures the remaining distance to a
//! centered smooth as `n * ln(ssq / n)`, and adds a penalty of
//! `adjustment / |jump|` per accepted jump. The prefix minimizing the sum
//! wins; small spurious jumps carry large penalties and are dropped.

use crate::estimate::ForceEventEstimate;
use crate::smooth::LocalLinearSmoother;
use fcurve_core::{Channel1DData, Error, IndexRange, Point2D, Result, SortedArrayOrder};
use tracing::debug;

/// Floor applied to residual sums before taking logarithms.
const SSQ_FLOOR: f64 = 1e-300;

/// JIC jump detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpInformationCriterion {
    smoother: LocalLinearSmoother,
    adjustment: f64,
}

impl JumpInformationCriterion {
    /// `window` is the one-sided smoothing window in points.
    pub fn new(window: usize) -> Self {
        Self {
            smoother: LocalLinearSmoother::new(window),
            adjustment: 2.0,
        }
    }

    /// Penalty weight per unit of inverse jump magnitude.
    pub fn with_adjustment(mut self, adjustment: f64) -> Result<Self> {
        if !(adjustment > 0.0) {
            return Err(Error::non_positive("adjustment factor", adjustment));
        }
        self.adjustment = adjustment;
        Ok(self)
    }

    /// Jump events of a branch, optionally restricted to an x domain.
    /// Branches shorter than one smoothing window yield an empty list.
    pub fn events(
        &self,
        branch: &Channel1DData,
        domain: Option<(f64, f64)>,
    ) -> Result<Vec<ForceEventEstimate>> {
        let restricted = match domain {
            Some((xmin, xmax)) => branch.restricted_to_domain(xmin, xmax),
            None => branch.clone(),
        };
        let sorted = restricted.sorted_by_x(SortedArrayOrder::Ascending);
        let n = sorted.len();
        let window = self.smoother.window();
        if n < 2 * window {
            return Ok(Vec::new());
        }
        let xs = sorted.xs();
        let ys = sorted.ys();

        let left = self.smoother.left_values(xs, ys);
        let right = self.smoother.right_values(xs, ys);
        let scores: Vec<f64> = left
            .iter()
            .zip(right.iter())
            .map(|(&l, &r)| {
                let gap = (l - r).abs();
                if gap.is_finite() {
                    gap
                } else {
                    0.0
                }
            })
            .collect();

        let candidates = greedy_candidates(&scores, window / 2);
        let selected_count = self.select_model_order(xs, ys, &left, &right, &candidates);
        debug!(
            candidates = candidates.len(),
            selected = selected_count,
            "jump model order selected"
        );

        let mut selected: Vec<usize> = candidates[..selected_count].to_vec();
        selected.sort_unstable();
        Ok(selected
            .into_iter()
            .map(|i| {
                ForceEventEstimate::new(Point2D::new(xs[i], left[i]), Point2D::new(xs[i], right[i]))
            })
            .collect())
    }

    /// Number of leading candidates minimizing the penalized criterion.
    fn select_model_order(
        &self,
        xs: &[f64],
        ys: &[f64],
        left: &[f64],
        right: &[f64],
        candidates: &[usize],
    ) -> usize {
        let n = ys.len();
        let mut flattened = ys.to_vec();
        let mut penalty = 0.0;
        let mut best_count = 0;
        let mut best_criterion = self.criterion(xs, &flattened, penalty);

        for (m, &index) in candidates.iter().enumerate() {
            let jump = right[index] - left[index];
            if jump == 0.0 || !jump.is_finite() {
                break;
            }
            for value in &mut flattened[index..n] {
                *value -= jump;
            }
            penalty += self.adjustment / jump.abs();
            let criterion = self.criterion(xs, &flattened, penalty);
            if criterion < best_criterion {
                best_criterion = criterion;
                best_count = m + 1;
            }
        }
        best_count
    }

    /// `n * ln(ssq / n) + penalty` with the residuals taken against a
    /// centered smooth of the flattened signal.
    fn criterion(&self, xs: &[f64], flattened: &[f64], penalty: f64) -> f64 {
        let n = flattened.len();
        let reference = self.smoother.centered_values(xs, flattened);
        let ssq: f64 = flattened
            .iter()
            .zip(reference.iter())
            .map(|(&y, &s)| {
                let r = y - s;
                if r.is_finite() {
                    r * r
                } else {
                    0.0
                }
            })
            .sum();
        n as f64 * (ssq.max(SSQ_FLOOR) / n as f64).ln() + penalty
    }
}

/// Candidate jump indices in decreasing score order, each masking the
/// `half_width` neighborhood around itself from later picks.
fn greedy_candidates(scores: &[f64], half_width: usize) -> Vec<usize> {
    let n = scores.len();
    let mut candidates = Vec::new();
    let mut masked: Vec<IndexRange> = Vec::new();

    loop {
        let mut best: Option<(usize, f64)> = None;
        for (i, &score) in scores.iter().enumerate() {
            if score <= 0.0 || masked.iter().any(|r| r.contains(i)) {
                continue;
            }
            match best {
                Some((_, s)) if s >= score => {}
                _ => best = Some((i, score)),
            }
        }
        let Some((index, _)) = best else {
            break;
        };
        candidates.push(index);
        masked.push(IndexRange::new(
            index.saturating_sub(half_width),
            (index + half_width).min(n.saturating_sub(1)),
        ));
        masked = IndexRange::simplify(masked);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcurve_core::{BaseUnit, Quantity, SiPrefix, Unit};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn channel(xs: Vec<f64>, ys: Vec<f64>) -> Channel1DData {
        Channel1DData::new(
            xs,
            ys,
            Quantity::new("distance", Unit::new(SiPrefix::Micro, BaseUnit::Meter)),
            Quantity::new("force", Unit::new(SiPrefix::Nano, BaseUnit::Newton)),
        )
        .unwrap()
    }

    fn step_signal(n: usize, step_at: usize, magnitude: f64, noise_sd: f64, seed: u64) -> Channel1DData {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let ys: Vec<f64> = (0..n)
            .map(|i| {
                let clean = if i < step_at { 0.0 } else { magnitude };
                clean + noise_sd * rng.gen_range(-1.0..1.0)
            })
            .collect();
        channel(xs, ys)
    }

    #[test]
    fn test_single_step_yields_one_event_near_step() {
        let window = 8;
        let step_at = 60;
        let branch = step_signal(120, step_at, 4.0, 0.05, 21);
        let detector = JumpInformationCriterion::new(window);
        let events = detector.events(&branch, None).unwrap();
        assert_eq!(events.len(), 1, "expected exactly one jump event");
        let event = events[0];
        assert!(
            (event.start().x - step_at as f64).abs() <= (window / 2) as f64,
            "event at {} far from step {step_at}",
            event.start().x
        );
        assert!((event.force() - 4.0).abs() < 1.0);
    }

    #[test]
    fn test_two_separated_steps_yield_two_events() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let xs: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let ys: Vec<f64> = (0..200)
            .map(|i| {
                let clean = if i < 60 {
                    0.0
                } else if i < 140 {
                    5.0
                } else {
                    2.0
                };
                clean + 0.05 * rng.gen_range(-1.0..1.0)
            })
            .collect();
        let branch = channel(xs, ys);
        let events = JumpInformationCriterion::new(8).events(&branch, None).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].start().x < events[1].start().x);
    }

    #[test]
    fn test_smooth_signal_yields_no_events() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let xs: Vec<f64> = (0..150).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| 0.02 * x + 0.05 * rng.gen_range(-1.0..1.0))
            .collect();
        let branch = channel(xs, ys);
        let events = JumpInformationCriterion::new(10).events(&branch, None).unwrap();
        assert!(events.is_empty(), "found {} spurious events", events.len());
    }

    #[test]
    fn test_short_branch_yields_no_events() {
        let branch = step_signal(10, 5, 4.0, 0.0, 1);
        let events = JumpInformationCriterion::new(8).events(&branch, None).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_greedy_candidates_mask_neighborhoods() {
        let mut scores = vec![0.1; 30];
        scores[10] = 5.0;
        scores[12] = 4.0; // inside the mask of 10
        scores[25] = 3.0;
        let candidates = greedy_candidates(&scores, 4);
        assert_eq!(candidates[0], 10);
        assert!(candidates.contains(&25));
        assert!(!candidates.contains(&12));
    }

    #[test]
    fn test_invalid_adjustment_rejected() {
        assert!(JumpInformationCriterion::new(8).with_adjustment(0.0).is_err());
        assert!(JumpInformationCriterion::new(8).with_adjustment(-1.0).is_err());
    }
}
