//! Normal-equation solver shared by the regression strategies
//!
//! Builds the (optionally weighted) normal equations for a [`FitModel`] over
//! the full data, a subset of indices, or both, and solves them by Cholesky
//! decomposition with an SVD fallback for rank-deficient systems.

use crate::function::{FitModel, FittedFunction};
use fcurve_core::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Solve the weighted least-squares problem for `model` over the points
/// selected by `subset` (all points when `None`).
///
/// `weights`, when present, is indexed by the original point index and must
/// be non-negative.
pub fn solve_weighted(
    xs: &[f64],
    ys: &[f64],
    model: FitModel,
    subset: Option<&[usize]>,
    weights: Option<&[f64]>,
) -> Result<FittedFunction> {
    debug_assert_eq!(xs.len(), ys.len());
    let p = model.parameter_count();
    let n = subset.map_or(xs.len(), <[usize]>::len);
    if n < p {
        return Err(Error::InsufficientData {
            expected: p,
            actual: n,
        });
    }

    let mut xtx = DMatrix::<f64>::zeros(p, p);
    let mut xty = DVector::<f64>::zeros(p);

    let mut accumulate = |index: usize| {
        let w = weights.map_or(1.0, |w| w[index]);
        if w == 0.0 {
            return;
        }
        let basis = model.basis(xs[index]);
        for i in 0..p {
            let wi = w * basis[i];
            xty[i] += wi * ys[index];
            for j in i..p {
                xtx[(i, j)] += wi * basis[j];
            }
        }
    };

    match subset {
        Some(indices) => indices.iter().for_each(|&i| accumulate(i)),
        None => (0..xs.len()).for_each(&mut accumulate),
    }

    // Mirror the upper triangle
    for i in 0..p {
        for j in 0..i {
            xtx[(i, j)] = xtx[(j, i)];
        }
    }

    let parameters = solve_normal_equations(xtx, xty)?;
    Ok(model.assemble(parameters.as_slice()))
}

/// Plain unweighted least squares over all points.
pub fn solve(xs: &[f64], ys: &[f64], model: FitModel) -> Result<FittedFunction> {
    solve_weighted(xs, ys, model, None, None)
}

/// Cholesky solve with SVD fallback for rank-deficient systems.
fn solve_normal_equations(xtx: DMatrix<f64>, xty: DVector<f64>) -> Result<DVector<f64>> {
    match xtx.clone().cholesky() {
        Some(chol) => Ok(chol.solve(&xty)),
        None => {
            let svd = xtx.svd(true, true);
            svd.solve(&xty, 1e-12)
                .map_err(|_| Error::Computation("failed to solve normal equations".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_line_recovery() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 2.0 + 3.0 * x).collect();
        let f = solve(&xs, &ys, FitModel::line()).unwrap();
        assert_relative_eq!(f.value(0.0), 2.0, epsilon = 1e-9);
        assert_relative_eq!(f.value(1.0), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_subset_fit_ignores_excluded_points() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 2.0, 100.0]; // last point is garbage
        let f = solve_weighted(&xs, &ys, FitModel::line(), Some(&[0, 1, 2]), None).unwrap();
        assert_relative_eq!(f.value(3.0), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_weighted_fit_downweights_outlier() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 2.0, 100.0];
        let weights = vec![1.0, 1.0, 1.0, 0.0];
        let f = solve_weighted(&xs, &ys, FitModel::line(), None, Some(&weights)).unwrap();
        assert_relative_eq!(f.value(3.0), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_power_law_fixed_exponent() {
        let xs: Vec<f64> = vec![1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|&x| 1.5 * x.powf(2.0)).collect();
        let f = solve(&xs, &ys, FitModel::PowerLaw { exponent: 2.0 }).unwrap();
        assert_relative_eq!(f.value(2.0), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_underdetermined_is_an_error() {
        let err = solve(&[1.0], &[1.0], FitModel::line());
        assert!(matches!(err, Err(Error::InsufficientData { .. })));
    }

    #[test]
    fn test_degenerate_design_falls_back_to_svd() {
        // All x equal: the line is rank deficient, but a solution exists
        let xs = vec![2.0, 2.0, 2.0];
        let ys = vec![1.0, 2.0, 3.0];
        let f = solve(&xs, &ys, FitModel::line()).unwrap();
        assert_relative_eq!(f.value(2.0), 2.0, epsilon = 1e-6);
    }
}
