//! One-dimensional minimum search over an index range
//!
//! The contact-point estimators minimize a noisy objective sampled at
//! integer indices. [`MinimumSearchStrategy`] is the closed family of ways
//! to do that: golden-section bracketing (fast, assumes unimodality), a
//! focused grid (coarse pass plus refinement), and exhaustive evaluation
//! (the correctness baseline). Every strategy sees the objective through
//! [`guarded`], which turns non-finite evaluations into `+inf` so invalid
//! trial points are skipped instead of propagated.

/// A 1-D minimum search over `[min_index, max_index]`.
///
/// Returns the real-valued location of the minimum; callers round to the
/// nearest integer index.
pub trait MinimumSearchStrategy {
    fn minimum(&self, f: &mut dyn FnMut(f64) -> f64, min_index: f64, max_index: f64) -> f64;
}

/// Wrap an objective so non-finite values become `+inf`.
pub fn guarded<'a>(f: &'a mut dyn FnMut(f64) -> f64) -> impl FnMut(f64) -> f64 + 'a {
    move |x| {
        let value = f(x);
        if value.is_finite() {
            value
        } else {
            f64::INFINITY
        }
    }
}

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_894_9;

/// Golden-section search.
///
/// Converges quickly on unimodal objectives; on multimodal ones it finds a
/// local minimum, which is why the exhaustive strategy exists as a
/// validation baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldenSectionSearch {
    tolerance: f64,
    max_iterations: usize,
}

impl Default for GoldenSectionSearch {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            max_iterations: 100,
        }
    }
}

impl GoldenSectionSearch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MinimumSearchStrategy for GoldenSectionSearch {
    fn minimum(&self, f: &mut dyn FnMut(f64) -> f64, min_index: f64, max_index: f64) -> f64 {
        let mut f = guarded(f);
        let (mut a, mut b) = (min_index.min(max_index), min_index.max(max_index));
        let mut c = b - GOLDEN_RATIO_CONJUGATE * (b - a);
        let mut d = a + GOLDEN_RATIO_CONJUGATE * (b - a);
        let mut fc = f(c);
        let mut fd = f(d);

        for _ in 0..self.max_iterations {
            if (b - a).abs() <= self.tolerance {
                break;
            }
            if fc < fd {
                b = d;
                d = c;
                fd = fc;
                c = b - GOLDEN_RATIO_CONJUGATE * (b - a);
                fc = f(c);
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + GOLDEN_RATIO_CONJUGATE * (b - a);
                fd = f(d);
            }
        }
        if fc < fd {
            c
        } else {
            d
        }
    }
}

/// Coarse grid followed by refinement around the best grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusedGridSearch {
    grid_points: usize,
    refinements: usize,
}

impl Default for FocusedGridSearch {
    fn default() -> Self {
        Self {
            grid_points: 20,
            refinements: 4,
        }
    }
}

impl FocusedGridSearch {
    pub fn new(grid_points: usize, refinements: usize) -> Self {
        Self {
            grid_points: grid_points.max(3),
            refinements: refinements.max(1),
        }
    }
}

impl MinimumSearchStrategy for FocusedGridSearch {
    fn minimum(&self, f: &mut dyn FnMut(f64) -> f64, min_index: f64, max_index: f64) -> f64 {
        let mut f = guarded(f);
        let (mut a, mut b) = (min_index.min(max_index), min_index.max(max_index));
        let mut best_x = a;
        let mut best_value = f64::INFINITY;

        for _ in 0..self.refinements {
            let step = (b - a) / (self.grid_points - 1) as f64;
            let mut local_best_x = a;
            let mut local_best_value = f64::INFINITY;
            for i in 0..self.grid_points {
                let x = a + step * i as f64;
                let value = f(x);
                if value < local_best_value {
                    local_best_value = value;
                    local_best_x = x;
                }
            }
            if local_best_value < best_value {
                best_value = local_best_value;
                best_x = local_best_x;
            }
            // Narrow to one grid cell on either side of the best point
            a = (local_best_x - step).max(min_index.min(max_index));
            b = (local_best_x + step).min(min_index.max(max_index));
            if step <= 1.0 {
                break;
            }
        }
        best_x
    }
}

/// Evaluate every integer in range. Slow and exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExhaustiveSearch;

impl ExhaustiveSearch {
    pub fn new() -> Self {
        Self
    }
}

impl MinimumSearchStrategy for ExhaustiveSearch {
    fn minimum(&self, f: &mut dyn FnMut(f64) -> f64, min_index: f64, max_index: f64) -> f64 {
        let mut f = guarded(f);
        let lo = min_index.min(max_index).ceil() as i64;
        let hi = max_index.max(min_index).floor() as i64;
        let mut best_x = lo as f64;
        let mut best_value = f64::INFINITY;
        for i in lo..=hi {
            let x = i as f64;
            let value = f(x);
            if value < best_value {
                best_value = value;
                best_x = x;
            }
        }
        best_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parabola(center: f64) -> impl FnMut(f64) -> f64 {
        move |x: f64| {
            let i = x.round();
            (i - center) * (i - center)
        }
    }

    #[test]
    fn test_all_strategies_agree_on_parabola() {
        let center = 37.0;
        let golden = GoldenSectionSearch::new()
            .minimum(&mut parabola(center), 0.0, 100.0)
            .round();
        let grid = FocusedGridSearch::default()
            .minimum(&mut parabola(center), 0.0, 100.0)
            .round();
        let exhaustive = ExhaustiveSearch
            .minimum(&mut parabola(center), 0.0, 100.0)
            .round();
        assert_eq!(exhaustive, center);
        assert!((golden - center).abs() <= 1.0);
        assert!((grid - center).abs() <= 1.0);
    }

    #[test]
    fn test_non_finite_evaluations_are_skipped() {
        // NaN inside the range must not win or poison the search
        let mut f = |x: f64| {
            let i = x.round();
            if (20.0..30.0).contains(&i) {
                f64::NAN
            } else {
                (i - 50.0).abs()
            }
        };
        let best = ExhaustiveSearch.minimum(&mut f, 0.0, 100.0).round();
        assert_eq!(best, 50.0);

        let mut g = |x: f64| {
            let i = x.round();
            if i < 10.0 {
                f64::NEG_INFINITY
            } else {
                (i - 42.0).abs()
            }
        };
        let best = ExhaustiveSearch.minimum(&mut g, 0.0, 100.0).round();
        assert_eq!(best, 42.0);
    }

    #[test]
    fn test_minimum_at_range_edge() {
        let mut f = |x: f64| x;
        assert_eq!(ExhaustiveSearch.minimum(&mut f, 3.0, 10.0), 3.0);
        let golden = GoldenSectionSearch::new().minimum(&mut |x| x, 3.0, 10.0);
        assert!((golden - 3.0).abs() <= 1.0);
    }

    #[test]
    fn test_reversed_bounds_tolerated() {
        let best = ExhaustiveSearch.minimum(&mut parabola(5.0), 10.0, 0.0);
        assert_eq!(best, 5.0);
    }

    #[test]
    fn test_single_point_range() {
        let best = ExhaustiveSearch.minimum(&mut parabola(0.0), 7.0, 7.0);
        assert_eq!(best, 7.0);
    }
}
