//! Project a fitted line and its error band back onto the abscissa.

use tracing::debug;

use crate::domain::{FitLines, FitResult, MismatchStrategy};
use crate::error::Result;
use crate::fit::estimator;

/// Evaluate predicted, upper and lower lines at every abscissa value.
///
/// Without a `fit`, the measurements are fitted first with `MismatchStrategy::Fail`.
/// A supplied `fit` must pass `FitResult::validate`; its consistency with
/// `abscissa`/`ordinates` is the caller's business.
pub fn project(abscissa: &[f64], ordinates: &[f64], fit: Option<&FitResult>) -> Result<FitLines> {
    let fit = match fit {
        Some(fit) => {
            fit.validate()?;
            *fit
        }
        None => estimator::fit(abscissa, ordinates, MismatchStrategy::Fail)?,
    };

    debug!(n = abscissa.len(), "projecting fit lines");
    Ok(lines_for(&fit, abscissa, ordinates))
}

fn lines_for(fit: &FitResult, abscissa: &[f64], ordinates: &[f64]) -> FitLines {
    let upper_slope = fit.slope + fit.slope_error;
    let upper_intercept = fit.intercept + fit.intercept_error;
    let lower_slope = fit.slope - fit.slope_error;
    let lower_intercept = fit.intercept - fit.intercept_error;

    let mut predicted = Vec::with_capacity(abscissa.len());
    let mut upper = Vec::with_capacity(abscissa.len());
    let mut lower = Vec::with_capacity(abscissa.len());
    for &x in abscissa {
        predicted.push(fit.predict(x));
        upper.push(upper_slope * x + upper_intercept);
        lower.push(lower_slope * x + lower_intercept);
    }

    FitLines {
        abscissa: abscissa.to_vec(),
        ordinates: ordinates.to_vec(),
        predicted,
        upper,
        lower,
    }
}
