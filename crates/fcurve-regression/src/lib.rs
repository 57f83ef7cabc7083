//! Linear regression strategies for force-curve analysis
//!
//! This crate provides the closed family of regression objectives the
//! force-curve pipeline fits with:
//!
//! - **L2** ([`LeastSquares`]): ordinary least squares, closed form
//! - **L1** ([`LeastAbsoluteDeviations`]): least absolute deviations via IRLS
//! - **LTS / LTA** ([`TrimmedRegression`]): least trimmed squares/absolute
//!   values with seeded randomized multi-start
//! - **High-coverage LTS / LTA** ([`HighCoverageTrimmed`]): trimmed fits
//!   that also search over coverage counts, for baseline noise estimation
//! - **Supported postcontact** ([`SupportedPostcontactFit`]): trimmed fit
//!   anchored to a mandatory low-force support prefix
//!
//! All strategies share one contract ([`RegressionStrategy`]): fit a
//! [`FitModel`] over full data or a `[from, to)` sub-range, report the
//! objective-function minimum (0 for underdetermined ranges, never an
//! error), and score externally supplied functions.
//!
//! ## Usage
//!
//! ```rust
//! use fcurve_regression::{FitModel, RegressionStrategy, TrimmedRegression};
//!
//! let xs: Vec<f64> = (0..40).map(|i| i as f64).collect();
//! let mut ys: Vec<f64> = xs.iter().map(|&x| 1.0 + 0.5 * x).collect();
//! ys[7] += 100.0; // a gross outlier
//!
//! let lts = TrimmedRegression::squares().with_seed(1);
//! let fit = lts.perform_regression(&xs, &ys, FitModel::line()).unwrap();
//! assert!((fit.function().value(0.0) - 1.0).abs() < 0.1);
//! ```

pub mod design;
pub mod function;
pub mod lad;
pub mod ols;
pub mod supported;
pub mod traits;
pub mod trimmed;

pub use function::{FitModel, FittedFunction};
pub use lad::LeastAbsoluteDeviations;
pub use ols::LeastSquares;
pub use supported::SupportedPostcontactFit;
pub use traits::{RegressionFit, RegressionStrategy};
pub use trimmed::{HighCoverageTrimmed, TrimmedObjective, TrimmedRegression};
