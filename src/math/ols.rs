//! Least squares building blocks for the straight-line model.
//!
//! The estimator works from sample moments:
//!
//! ```text
//! slope = (mean(x·y) − mean(x)·mean(y)) / (mean(x²) − mean(x)²)
//! ```
//!
//! Numerator and denominator are evaluated as `mean((x − x̄)(y − ȳ))` and
//! `mean((x − x̄)²)`. The raw forms lose every significant digit once the
//! abscissa carries an offset like a Unix timestamp.
//!
//! `solve_least_squares` solves the same problem through an SVD of the design
//! matrix `[1, x]`. It is slower but independent of the moment formulas, which
//! makes it a useful cross-check in the debug bundle.

use nalgebra::{DMatrix, DVector};

use crate::domain::SampleStatistics;

/// First and second sample moments of paired data.
///
/// `x` and `y` must have the same, non-zero length.
pub fn sample_moments(x: &DVector<f64>, y: &DVector<f64>) -> SampleStatistics {
    let n = x.len();
    let n_f = n as f64;
    let abscissa_mean = x.mean();
    let ordinate_mean = y.mean();
    let dx = x.add_scalar(-abscissa_mean);
    let dy = y.add_scalar(-ordinate_mean);

    SampleStatistics {
        n,
        abscissa_mean,
        ordinate_mean,
        product_mean: x.dot(y) / n_f,
        abscissa_squared_mean: x.norm_squared() / n_f,
        abscissa_variance: dx.norm_squared() / n_f,
        covariance: dx.dot(&dy) / n_f,
    }
}

/// Σ (yᵢ − slope·xᵢ − intercept)², evaluated on centered data.
///
/// `intercept` is implied by `ȳ − slope·x̄`, which keeps the residuals free of
/// the large cancelling terms `slope·xᵢ` and `intercept` when x is offset.
pub fn centered_residual_sum_of_squares(x: &DVector<f64>, y: &DVector<f64>, slope: f64) -> f64 {
    let dx = x.add_scalar(-x.mean());
    let dy = y.add_scalar(-y.mean());
    residual_sum_of_squares(&dx, &dy, slope, 0.0)
}

/// Σ (yᵢ − slope·xᵢ − intercept)²
pub fn residual_sum_of_squares(x: &DVector<f64>, y: &DVector<f64>, slope: f64, intercept: f64) -> f64 {
    x.zip_map(y, |xi, yi| yi - slope * xi - intercept).norm_squared()
}

/// Design matrix with an intercept column followed by `x`.
pub fn line_design_matrix(x: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { 1.0 } else { x[i] })
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
