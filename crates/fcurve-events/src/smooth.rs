//! Local linear smooths over index windows
//!
//! The jump detector compares two one-sided smooths of the force signal:
//! the left smooth at point `i` fits a line to the `window` points strictly
//! before `i`, the right smooth to the `window` points from `i` onward.
//! Away from any jump the two agree; across a discontinuity their gap
//! approximates the jump magnitude. A centered smooth over the same window
//! width serves as the reference signal for residual computation.
//!
//! Each local fit is the closed-form simple linear regression evaluated at
//! the query abscissa, falling back to the window mean when the abscissas
//! are degenerate. Windows holding fewer than two points yield NaN; callers
//! treat those edge values as carrying no evidence.

/// Index-window local linear smoother.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalLinearSmoother {
    window: usize,
}

impl LocalLinearSmoother {
    /// `window` is the number of points each one-sided fit sees; clamped to
    /// at least 2.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(2),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Smooth value at each point from the window `[i - window, i)`.
    pub fn left_values(&self, xs: &[f64], ys: &[f64]) -> Vec<f64> {
        (0..xs.len())
            .map(|i| {
                let from = i.saturating_sub(self.window);
                fit_at(&xs[from..i], &ys[from..i], xs[i])
            })
            .collect()
    }

    /// Smooth value at each point from the window `[i, i + window)`.
    pub fn right_values(&self, xs: &[f64], ys: &[f64]) -> Vec<f64> {
        let n = xs.len();
        (0..n)
            .map(|i| {
                let to = (i + self.window).min(n);
                fit_at(&xs[i..to], &ys[i..to], xs[i])
            })
            .collect()
    }

    /// Smooth value at each point from the centered window
    /// `[i - window/2, i + window/2]`.
    pub fn centered_values(&self, xs: &[f64], ys: &[f64]) -> Vec<f64> {
        let n = xs.len();
        let half = self.window / 2;
        (0..n)
            .map(|i| {
                let from = i.saturating_sub(half);
                let to = (i + half + 1).min(n);
                fit_at(&xs[from..to], &ys[from..to], xs[i])
            })
            .collect()
    }
}

/// Closed-form line fit over a window, evaluated at `x0`.
///
/// A window needs two points to carry trend evidence; smaller windows
/// yield NaN.
fn fit_at(xs: &[f64], ys: &[f64], x0: f64) -> f64 {
    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }
    let inv_n = 1.0 / n as f64;
    let mean_x = xs.iter().sum::<f64>() * inv_n;
    let mean_y = ys.iter().sum::<f64>() * inv_n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx.abs() < f64::EPSILON * n as f64 {
        return mean_y;
    }
    let slope = sxy / sxx;
    mean_y + slope * (x0 - mean_x)
}
