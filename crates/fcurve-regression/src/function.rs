//! Fitted univariate functions
//!
//! The closed family of function shapes a regression can produce: a
//! polynomial of bounded degree (with or without constant term) or a
//! single-exponent power law. Fitted functions are immutable values;
//! evaluation is the only operation the downstream layers need.

use fcurve_core::Point2D;

/// Model specification handed to a regression strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitModel {
    /// Polynomial of the given degree; `constant` controls the intercept term.
    Polynomial { degree: usize, constant: bool },
    /// Power law `a * x^exponent` with the exponent fixed a priori.
    PowerLaw { exponent: f64 },
}

impl FitModel {
    /// Convenience: a line with intercept.
    pub fn line() -> Self {
        FitModel::Polynomial {
            degree: 1,
            constant: true,
        }
    }

    /// Number of free parameters the model estimates.
    pub fn parameter_count(&self) -> usize {
        match *self {
            FitModel::Polynomial { degree, constant } => degree + usize::from(constant),
            FitModel::PowerLaw { .. } => 1,
        }
    }

    /// Basis function values at `x`, in estimation order.
    pub(crate) fn basis(&self, x: f64) -> Vec<f64> {
        match *self {
            FitModel::Polynomial { degree, constant } => {
                let mut basis = Vec::with_capacity(self.parameter_count());
                if constant {
                    basis.push(1.0);
                }
                let mut power = x;
                for _ in 1..=degree {
                    basis.push(power);
                    power *= x;
                }
                basis
            }
            FitModel::PowerLaw { exponent } => vec![x.powf(exponent)],
        }
    }

    /// Assemble a fitted function from estimated parameters.
    pub(crate) fn assemble(&self, parameters: &[f64]) -> FittedFunction {
        match *self {
            FitModel::Polynomial { degree, constant } => {
                let mut coefficients = vec![0.0; degree + 1];
                let mut k = 0;
                if constant {
                    coefficients[0] = parameters[k];
                    k += 1;
                }
                for (power, c) in coefficients.iter_mut().enumerate().skip(1) {
                    *c = parameters[k + power - 1];
                }
                FittedFunction::Polynomial { coefficients }
            }
            FitModel::PowerLaw { exponent } => FittedFunction::PowerLaw {
                coefficient: parameters[0],
                exponent,
            },
        }
    }
}

/// A fitted univariate function.
#[derive(Debug, Clone, PartialEq)]
pub enum FittedFunction {
    /// Dense coefficients, index = power of x.
    Polynomial { coefficients: Vec<f64> },
    /// `coefficient * x^exponent`.
    PowerLaw { coefficient: f64, exponent: f64 },
}

impl FittedFunction {
    /// The zero function, the neutral fit for degenerate inputs.
    pub fn zero() -> Self {
        FittedFunction::Polynomial {
            coefficients: vec![0.0],
        }
    }

    /// Evaluate at `x`.
    pub fn value(&self, x: f64) -> f64 {
        match self {
            FittedFunction::Polynomial { coefficients } => {
                // Horner evaluation
                coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
            }
            FittedFunction::PowerLaw {
                coefficient,
                exponent,
            } => coefficient * x.powf(*exponent),
        }
    }

    /// The point `(x, f(x))`.
    pub fn point_at(&self, x: f64) -> Point2D {
        Point2D::new(x, self.value(x))
    }

    /// Residuals `y_i - f(x_i)`.
    pub fn residuals(&self, xs: &[f64], ys: &[f64]) -> Vec<f64> {
        xs.iter()
            .zip(ys.iter())
            .map(|(&x, &y)| y - self.value(x))
            .collect()
    }
}
