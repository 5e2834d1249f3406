//! Ordinary least squares for `y = slope·x + intercept`.
//!
//! The pipeline for one call is:
//! 1. check every element is a finite number
//! 2. reconcile lengths according to the `MismatchStrategy`
//! 3. require at least `MIN_POINTS` pairs
//! 4. compute moments, parameters and their standard errors
//!
//! Every rejection is logged before it is returned.

use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::domain::{FitResult, MIN_POINTS, MismatchStrategy, SampleSet, SampleStatistics};
use crate::error::{Axis, LsmError, Result};
use crate::math::{centered_residual_sum_of_squares, sample_moments};

/// Fit a line through paired measurements.
pub fn fit(abscissa: &[f64], ordinates: &[f64], strategy: MismatchStrategy) -> Result<FitResult> {
    let samples = normalize(abscissa, ordinates, strategy)?;
    fit_samples(&samples)
}

/// Validate measurements and reconcile their lengths into a `SampleSet`.
///
/// The caller's slices are never modified; truncation copies.
pub fn normalize(abscissa: &[f64], ordinates: &[f64], strategy: MismatchStrategy) -> Result<SampleSet> {
    check_finite(Axis::Abscissa, abscissa).map_err(rejected)?;
    check_finite(Axis::Ordinates, ordinates).map_err(rejected)?;

    let n = reconcile_lengths(abscissa.len(), ordinates.len(), strategy).map_err(rejected)?;
    if n < MIN_POINTS {
        return Err(rejected(LsmError::InsufficientData {
            required: MIN_POINTS,
            actual: n,
        }));
    }

    Ok(SampleSet::new_unchecked(
        abscissa[..n].to_vec(),
        ordinates[..n].to_vec(),
    ))
}

/// Sample moments of a validated set.
pub fn statistics(samples: &SampleSet) -> SampleStatistics {
    let x = DVector::from_column_slice(samples.abscissa());
    let y = DVector::from_column_slice(samples.ordinates());
    sample_moments(&x, &y)
}

/// Fit a line through an already validated `SampleSet`.
pub fn fit_samples(samples: &SampleSet) -> Result<FitResult> {
    let x = DVector::from_column_slice(samples.abscissa());
    let y = DVector::from_column_slice(samples.ordinates());
    let stats = sample_moments(&x, &y);
    let n = stats.n as f64;

    if is_degenerate(samples.abscissa(), &stats) {
        return Err(rejected(LsmError::DegenerateInput {
            value: samples.abscissa()[0],
        }));
    }
    let variance = finite("abscissa variance", stats.abscissa_variance)?;
    let covariance = finite("covariance", stats.covariance)?;
    let squared_mean = finite("mean square of the abscissa", stats.abscissa_squared_mean)?;

    let slope = finite("slope", covariance / variance)?;
    let intercept = finite("intercept", stats.ordinate_mean - slope * stats.abscissa_mean)?;

    let residual_variance = finite(
        "residual variance",
        centered_residual_sum_of_squares(&x, &y, slope) / (n - 2.0),
    )?;
    let slope_error = finite("slope error", (residual_variance / (n * variance)).sqrt())?;
    let intercept_error = finite(
        "intercept error",
        (residual_variance * squared_mean / (n * variance)).sqrt(),
    )?;

    let fit = FitResult {
        slope,
        intercept,
        slope_error,
        intercept_error,
    };

    debug!(
        n = stats.n,
        abscissa_mean = stats.abscissa_mean,
        ordinate_mean = stats.ordinate_mean,
        variance,
        residual_variance,
        "lsm moments"
    );
    info!(
        event = "fit_completed",
        n = stats.n,
        slope,
        intercept,
        slope_error,
        intercept_error,
        "least squares fit completed"
    );

    Ok(fit)
}

fn check_finite(axis: Axis, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(LsmError::InvalidSample {
            axis,
            index,
            value: values[index].to_string(),
        }),
        None => Ok(()),
    }
}

/// Number of pairs that survive reconciliation.
fn reconcile_lengths(n_abscissa: usize, n_ordinates: usize, strategy: MismatchStrategy) -> Result<usize> {
    if n_abscissa == n_ordinates {
        return Ok(n_abscissa);
    }
    match strategy {
        MismatchStrategy::Fail => Err(LsmError::LengthMismatch {
            abscissa: n_abscissa,
            ordinates: n_ordinates,
        }),
        MismatchStrategy::Truncate => {
            let n = n_abscissa.min(n_ordinates);
            debug!(
                from_abscissa = n_abscissa,
                from_ordinates = n_ordinates,
                to = n,
                "truncating mismatched measurements"
            );
            Ok(n)
        }
    }
}

fn is_degenerate(abscissa: &[f64], stats: &SampleStatistics) -> bool {
    let first = abscissa[0];
    // The second test catches spreads too small to survive squaring.
    abscissa.iter().all(|&v| v == first) || stats.abscissa_variance <= 0.0
}

/// Finite measurements can still overflow for extreme magnitudes.
fn finite(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(rejected(LsmError::Overflow { quantity }))
    }
}

fn rejected(err: LsmError) -> LsmError {
    warn!(event = "validation_failed", error = %err, "rejected measurements");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{line_design_matrix, solve_least_squares};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fits_four_point_fixture() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 5.0, 4.0];

        let fit = fit(&x, &y, MismatchStrategy::Fail).unwrap();
        assert!(close(fit.slope, 0.7));
        assert!(close(fit.intercept, 2.0));
        // SSR = 2.3, residual variance = 1.15, var(x) = 1.25
        assert!(close(fit.slope_error, 0.23_f64.sqrt()));
        assert!(close(fit.intercept_error, 1.725_f64.sqrt()));
    }

    #[test]
    fn fits_five_point_fixture() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];

        let fit = fit(&x, &y, MismatchStrategy::Fail).unwrap();
        assert!(close(fit.slope, 0.6));
        assert!(close(fit.intercept, 2.2));
    }

    #[test]
    fn matches_svd_reference() {
        let x = [0.5, 1.7, 2.2, 3.9, 5.1, 6.3, 8.0];
        let y = [1.1, 2.9, 3.2, 6.8, 8.1, 10.4, 12.9];

        let fit = fit(&x, &y, MismatchStrategy::Fail).unwrap();
        let beta = solve_least_squares(&line_design_matrix(&x), &DVector::from_row_slice(&y)).unwrap();
        assert!((fit.intercept - beta[0]).abs() < 1e-8);
        assert!((fit.slope - beta[1]).abs() < 1e-8);
    }

    #[test]
    fn exact_line_has_zero_errors() {
        let fit = fit(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0], MismatchStrategy::Fail).unwrap();
        assert!(close(fit.slope, 2.0));
        assert!(close(fit.intercept, 1.0));
        assert!(fit.slope_error.abs() < 1e-9);
        assert!(fit.intercept_error.abs() < 1e-9);
    }

    #[test]
    fn two_points_are_insufficient() {
        let err = fit(&[1.0, 2.0], &[1.0, 2.0], MismatchStrategy::Fail).unwrap_err();
        assert!(matches!(
            err,
            LsmError::InsufficientData {
                required: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn mismatch_fails_by_default() {
        let err = fit(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0], MismatchStrategy::default()).unwrap_err();
        assert!(matches!(
            err,
            LsmError::LengthMismatch {
                abscissa: 4,
                ordinates: 3
            }
        ));
    }

    #[test]
    fn truncate_keeps_leading_pairs() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 2.0, 3.0];

        let fit = fit(&x, &y, MismatchStrategy::Truncate).unwrap();
        assert!(close(fit.slope, 1.0));
        assert!(close(fit.intercept, 0.0));

        let samples = normalize(&x, &y, MismatchStrategy::Truncate).unwrap();
        assert_eq!(samples.abscissa(), &[1.0, 2.0, 3.0]);
        assert_eq!(samples.ordinates(), &[1.0, 2.0, 3.0]);
        // Caller's data is untouched.
        assert_eq!(x.len(), 4);
    }

    #[test]
    fn truncate_shortens_longer_ordinates() {
        let samples = normalize(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0, 0.0, -1.0], MismatchStrategy::Truncate).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples.ordinates(), &[3.0, 2.0, 1.0]);
    }

    #[test]
    fn truncate_still_requires_three_points() {
        let err = fit(&[1.0, 2.0], &[1.0, 2.0, 3.0, 4.0], MismatchStrategy::Truncate).unwrap_err();
        assert!(matches!(err, LsmError::InsufficientData { actual: 2, .. }));
    }

    #[test]
    fn constant_abscissa_is_degenerate() {
        let err = fit(&[5.0, 5.0, 5.0, 5.0], &[1.0, 2.0, 3.0, 4.0], MismatchStrategy::Fail).unwrap_err();
        assert!(matches!(err, LsmError::DegenerateInput { value } if value == 5.0));
    }

    #[test]
    fn constant_fractional_abscissa_is_degenerate() {
        let err = fit(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0], MismatchStrategy::Fail).unwrap_err();
        assert!(matches!(err, LsmError::DegenerateInput { .. }));
    }

    #[test]
    fn large_offset_abscissa_is_not_degenerate() {
        let x = [1.0e8, 1.0e8 + 1.0, 1.0e8 + 2.0];
        let fit = fit(&x, &[1.0, 2.0, 3.0], MismatchStrategy::Fail).unwrap();
        assert!((fit.slope - 1.0).abs() < 1e-9);
        assert!(fit.slope_error < 1e-9);
    }

    #[test]
    fn half_unit_steps_on_large_offset() {
        let x = [1.0e7, 1.0e7 + 0.5, 1.0e7 + 1.0];
        let fit = fit(&x, &[1.0, 2.0, 3.0], MismatchStrategy::Fail).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - (2.0 - 2.0 * (1.0e7 + 0.5))).abs() < 1e-6);
    }

    #[test]
    fn timestamp_abscissa_fits_exactly() {
        // One reading per minute starting at a Unix timestamp.
        let t0 = 1.7e9;
        let x = [t0, t0 + 60.0, t0 + 120.0, t0 + 180.0];
        let y = [1.0, 2.0, 3.0, 4.0];

        let fit = fit(&x, &y, MismatchStrategy::Fail).unwrap();
        let slope = 1.0 / 60.0;
        let intercept = 1.0 - slope * t0;
        assert!((fit.slope - slope).abs() < 1e-9);
        assert!(((fit.intercept - intercept) / intercept).abs() < 1e-12);
        assert!(fit.slope_error < 1e-9);
    }

    #[test]
    fn timestamp_abscissa_matches_shifted_fit() {
        let t0 = 1.7e9;
        let offsets = [0.0, 60.0, 120.0, 180.0, 240.0, 300.0];
        let y = [2.0, 2.9, 4.2, 4.8, 6.1, 7.0];
        let shifted: Vec<f64> = offsets.iter().map(|dt| t0 + dt).collect();

        let reference = fit(&offsets, &y, MismatchStrategy::Fail).unwrap();
        let fit = fit(&shifted, &y, MismatchStrategy::Fail).unwrap();
        assert!((fit.slope - reference.slope).abs() < 1e-9);
        assert!((fit.slope_error - reference.slope_error).abs() < 1e-9);
        assert!((fit.predict(t0) - reference.intercept).abs() < 1e-4);
    }

    #[test]
    fn overflowing_magnitudes_are_reported_as_overflow() {
        let err = fit(&[1.0e200, 2.0e200, 3.0e200], &[1.0, 2.0, 3.0], MismatchStrategy::Fail).unwrap_err();
        assert!(matches!(err, LsmError::Overflow { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let err = fit(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0], MismatchStrategy::Fail).unwrap_err();
        assert!(matches!(
            err,
            LsmError::InvalidSample {
                axis: Axis::Abscissa,
                index: 1,
                ..
            }
        ));

        let err = fit(&[1.0, 2.0, 3.0], &[1.0, 2.0, f64::INFINITY], MismatchStrategy::Fail).unwrap_err();
        assert!(matches!(
            err,
            LsmError::InvalidSample {
                axis: Axis::Ordinates,
                index: 2,
                ..
            }
        ));
    }

    #[test]
    fn statistics_follow_truncation() {
        let samples = normalize(&[1.0, 2.0, 3.0, 100.0], &[2.0, 4.0, 6.0], MismatchStrategy::Truncate).unwrap();
        let stats = statistics(&samples);
        assert_eq!(stats.n, 3);
        assert!(close(stats.abscissa_mean, 2.0));
        assert!(close(stats.ordinate_mean, 4.0));
    }

    #[test]
    fn repeated_calls_are_independent() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 5.0, 4.0];
        let first = fit(&x, &y, MismatchStrategy::Fail).unwrap();
        let _ = fit(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0], MismatchStrategy::Fail);
        let second = fit(&x, &y, MismatchStrategy::Fail).unwrap();
        assert_eq!(first, second);
    }
}
