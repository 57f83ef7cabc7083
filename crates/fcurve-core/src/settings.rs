//! Curve-processing configuration
//!
//! [`ProcessingSettings`] carries everything a single curve-processing run
//! needs to know about the instrument and the operator's choices: calibration
//! constants, which branch to fit, how the contact point is estimated, which
//! regression objective the fits use, and the reproducibility knobs of the
//! randomized robust fits. Built once through the validating builder and
//! consumed read-only.

use crate::channel::Point2D;
use crate::error::{Error, Result};
use crate::branch::BranchKind;

/// Regression objective used by the curve fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegressionChoice {
    /// Ordinary least squares (L2)
    LeastSquares,
    /// Least absolute deviations (L1)
    LeastAbsoluteDeviations,
    /// Least trimmed squares
    TrimmedSquares,
    /// Least trimmed absolute values
    TrimmedAbsolute,
}

/// Optional pre-fit smoothing of the raw deflection signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmootherChoice {
    /// Use the signal as recorded
    None,
    /// Local linear smoothing over a window of the given point count
    LocalLinear { window: usize },
}

/// How the contact point is located.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactChoice {
    /// Operator-supplied fixed point
    Manual(Point2D),
    /// Classical flexible search (plain L2 split objective)
    Classical,
    /// Robust flexible search (baseline-anchored trimmed split objective)
    Robust,
}

impl ContactChoice {
    pub fn is_automatic(&self) -> bool {
        !matches!(self, ContactChoice::Manual(_))
    }
}

/// Immutable configuration for one curve-processing invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingSettings {
    spring_constant: f64,
    sensitivity: f64,
    contact: ContactChoice,
    fitted_branch: BranchKind,
    regression: RegressionChoice,
    left_trim: f64,
    right_trim: f64,
    smoother: SmootherChoice,
    robust_starts: usize,
    seed: u64,
}

impl ProcessingSettings {
    pub fn builder(spring_constant: f64, sensitivity: f64) -> ProcessingSettingsBuilder {
        ProcessingSettingsBuilder {
            spring_constant,
            sensitivity,
            contact: ContactChoice::Classical,
            fitted_branch: BranchKind::Approach,
            regression: RegressionChoice::LeastSquares,
            left_trim: 0.0,
            right_trim: 0.0,
            smoother: SmootherChoice::None,
            robust_starts: 200,
            seed: 0x5EED,
        }
    }

    /// Cantilever spring constant, N/m.
    pub fn spring_constant(&self) -> f64 {
        self.spring_constant
    }

    /// Photodiode sensitivity, m/V.
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn contact(&self) -> ContactChoice {
        self.contact
    }

    pub fn fitted_branch(&self) -> BranchKind {
        self.fitted_branch
    }

    pub fn regression(&self) -> RegressionChoice {
        self.regression
    }

    /// Fractions of points dropped from the left/right curve ends before
    /// fitting.
    pub fn trim_fractions(&self) -> (f64, f64) {
        (self.left_trim, self.right_trim)
    }

    pub fn smoother(&self) -> SmootherChoice {
        self.smoother
    }

    /// Random start count for trimmed (LTS/LTA) fits.
    pub fn robust_starts(&self) -> usize {
        self.robust_starts
    }

    /// RNG seed for the randomized multi-start fits.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Validating builder for [`ProcessingSettings`].
#[derive(Debug, Clone)]
pub struct ProcessingSettingsBuilder {
    spring_constant: f64,
    sensitivity: f64,
    contact: ContactChoice,
    fitted_branch: BranchKind,
    regression: RegressionChoice,
    left_trim: f64,
    right_trim: f64,
    smoother: SmootherChoice,
    robust_starts: usize,
    seed: u64,
}

impl ProcessingSettingsBuilder {
    pub fn contact(mut self, contact: ContactChoice) -> Self {
        self.contact = contact;
        self
    }

    pub fn fitted_branch(mut self, branch: BranchKind) -> Self {
        self.fitted_branch = branch;
        self
    }

    pub fn regression(mut self, regression: RegressionChoice) -> Self {
        self.regression = regression;
        self
    }

    pub fn trim_fractions(mut self, left: f64, right: f64) -> Self {
        self.left_trim = left;
        self.right_trim = right;
        self
    }

    pub fn smoother(mut self, smoother: SmootherChoice) -> Self {
        self.smoother = smoother;
        self
    }

    pub fn robust_starts(mut self, starts: usize) -> Self {
        self.robust_starts = starts;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<ProcessingSettings> {
        if !(self.spring_constant > 0.0) {
            return Err(Error::non_positive("spring constant", self.spring_constant));
        }
        if !(self.sensitivity > 0.0) {
            return Err(Error::non_positive("sensitivity", self.sensitivity));
        }
        for (name, value) in [("left trim", self.left_trim), ("right trim", self.right_trim)] {
            if !(0.0..0.5).contains(&value) {
                return Err(Error::InvalidParameter(format!(
                    "{name} fraction must lie in [0, 0.5), got {value}"
                )));
            }
        }
        if let SmootherChoice::LocalLinear { window } = self.smoother {
            if window < 2 {
                return Err(Error::InvalidParameter(format!(
                    "smoothing window must cover at least 2 points, got {window}"
                )));
            }
        }
        if self.robust_starts == 0 {
            return Err(Error::InvalidParameter(
                "robust fits need at least one random start".to_string(),
            ));
        }
        Ok(ProcessingSettings {
            spring_constant: self.spring_constant,
            sensitivity: self.sensitivity,
            contact: self.contact,
            fitted_branch: self.fitted_branch,
            regression: self.regression,
            left_trim: self.left_trim,
            right_trim: self.right_trim,
            smoother: self.smoother,
            robust_starts: self.robust_starts,
            seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ProcessingSettings::builder(0.1, 5e-8).build().unwrap();
        assert_eq!(settings.contact(), ContactChoice::Classical);
        assert!(settings.contact().is_automatic());
        assert_eq!(settings.fitted_branch(), BranchKind::Approach);
        assert_eq!(settings.regression(), RegressionChoice::LeastSquares);
        assert_eq!(settings.robust_starts(), 200);
    }

    #[test]
    fn test_rejects_non_positive_constants() {
        assert!(ProcessingSettings::builder(0.0, 5e-8).build().is_err());
        assert!(ProcessingSettings::builder(0.1, -1.0).build().is_err());
        assert!(ProcessingSettings::builder(f64::NAN, 5e-8).build().is_err());
    }

    #[test]
    fn test_rejects_bad_trim_and_window() {
        assert!(ProcessingSettings::builder(0.1, 5e-8)
            .trim_fractions(0.5, 0.0)
            .build()
            .is_err());
        assert!(ProcessingSettings::builder(0.1, 5e-8)
            .smoother(SmootherChoice::LocalLinear { window: 1 })
            .build()
            .is_err());
        assert!(ProcessingSettings::builder(0.1, 5e-8)
            .robust_starts(0)
            .build()
            .is_err());
    }

    #[test]
    fn test_manual_contact_is_not_automatic() {
        let settings = ProcessingSettings::builder(0.1, 5e-8)
            .contact(ContactChoice::Manual(Point2D::new(1.0, 2.0)))
            .build()
            .unwrap();
        assert!(!settings.contact().is_automatic());
    }
}
