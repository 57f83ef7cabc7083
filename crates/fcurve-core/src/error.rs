//! Error types for force-curve analysis
//!
//! Provides a unified error type for all fcurve crates.

use thiserror::Error;

/// Core error type for force-curve processing operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} points, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for empty input
    pub fn empty_input() -> Self {
        Self::InsufficientData {
            expected: 1,
            actual: 0,
        }
    }

    /// Create an error for a physical constant that must be positive
    pub fn non_positive(name: &str, value: f64) -> Self {
        Self::InvalidParameter(format!("{name} must be positive, got {value}"))
    }

    /// Create an error for mismatched abscissa/ordinate array lengths
    pub fn length_mismatch(xs: usize, ys: usize) -> Self {
        Self::InvalidInput(format!(
            "abscissa and ordinate arrays differ in length: {xs} vs {ys}"
        ))
    }

    /// Create an error for incompatible physical units
    pub fn incompatible_units(from: &str, to: &str) -> Self {
        Self::InvalidInput(format!("cannot convert {from} into {to}"))
    }
}
