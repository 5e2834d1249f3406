//! Shared domain types.
//!
//! These types are intentionally kept lightweight. The ones that cross a file
//! boundary (`MismatchStrategy`, `FitResult`, `FitFile`) are serializable so a
//! fit can be saved and reloaded later for projecting lines.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::LsmError;

/// Minimum number of paired points for the error terms to be defined (they divide by `n - 2`).
pub const MIN_POINTS: usize = 3;

/// Default number of decimals in rendered reports.
pub const DEFAULT_PRECISION: usize = 3;

/// How to reconcile abscissa/ordinates of different lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MismatchStrategy {
    /// Reject mismatched input.
    #[default]
    Fail,
    /// Keep only the first `min(len)` pairs of both sequences.
    Truncate,
}

impl MismatchStrategy {
    pub fn name(self) -> &'static str {
        match self {
            MismatchStrategy::Fail => "fail",
            MismatchStrategy::Truncate => "truncate",
        }
    }
}

impl std::fmt::Display for MismatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MismatchStrategy {
    type Err = LsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(MismatchStrategy::Fail),
            "truncate" => Ok(MismatchStrategy::Truncate),
            other => Err(LsmError::UnsupportedStrategy(other.to_string())),
        }
    }
}

/// Paired measurements, validated: equal length, at least [`MIN_POINTS`], all finite.
///
/// Only `fit::estimator::normalize` builds one, so holding a `SampleSet` means
/// the invariants hold.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    abscissa: Vec<f64>,
    ordinates: Vec<f64>,
}

impl SampleSet {
    pub(crate) fn new_unchecked(abscissa: Vec<f64>, ordinates: Vec<f64>) -> Self {
        debug_assert_eq!(abscissa.len(), ordinates.len());
        Self {
            abscissa,
            ordinates,
        }
    }

    pub fn abscissa(&self) -> &[f64] {
        &self.abscissa
    }

    pub fn ordinates(&self) -> &[f64] {
        &self.ordinates
    }

    pub fn len(&self) -> usize {
        self.abscissa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abscissa.is_empty()
    }
}

/// Sample moments the closed-form estimator is built from.
///
/// Variance and covariance are taken around the means, so a large common
/// offset in the abscissa does not cancel away the spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStatistics {
    pub n: usize,
    pub abscissa_mean: f64,
    pub ordinate_mean: f64,
    /// mean(x·y)
    pub product_mean: f64,
    /// mean(x²)
    pub abscissa_squared_mean: f64,
    /// mean((x − x̄)²)
    pub abscissa_variance: f64,
    /// mean((x − x̄)(y − ȳ))
    pub covariance: f64,
}

/// Fitted line `y = slope·x + intercept` and the standard errors of both parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub slope: f64,
    pub intercept: f64,
    pub slope_error: f64,
    pub intercept_error: f64,
}

impl FitResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Check that the fit can be used to project lines.
    ///
    /// Fits built by the estimator always pass; this guards values loaded from
    /// files or assembled by hand.
    pub fn validate(&self) -> Result<(), LsmError> {
        let fields = [
            ("slope", self.slope),
            ("intercept", self.intercept),
            ("slope_error", self.slope_error),
            ("intercept_error", self.intercept_error),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(LsmError::InvalidFitResult(format!(
                    "{name} is not finite ({value})"
                )));
            }
        }
        if self.slope_error < 0.0 || self.intercept_error < 0.0 {
            return Err(LsmError::InvalidFitResult(
                "error terms must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input series echoed back with the fitted line and its error band.
#[derive(Debug, Clone, PartialEq)]
pub struct FitLines {
    pub abscissa: Vec<f64>,
    pub ordinates: Vec<f64>,
    pub predicted: Vec<f64>,
    /// `(slope + slope_error)·x + intercept + intercept_error`
    pub upper: Vec<f64>,
    /// `(slope − slope_error)·x + intercept − intercept_error`
    pub lower: Vec<f64>,
}

impl FitLines {
    pub fn len(&self) -> usize {
        self.abscissa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abscissa.is_empty()
    }
}

/// Report rendering settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    /// Digits after the decimal point for every numeric field.
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Synthetic sample settings for `lsm demo`.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub slope: f64,
    pub intercept: f64,
    /// Standard deviation of the Gaussian noise added to each ordinate.
    pub noise: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub seed: u64,
}

/// Run configuration for a single fit.
///
/// This is derived from CLI flags plus environment settings.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub strategy: MismatchStrategy,
    pub report: ReportConfig,
    pub report_path: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_lines: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
    pub debug: bool,
}

/// Portable fit file (`lsm fit --export-fit`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub created_at: DateTime<Utc>,
    pub n: usize,
    pub strategy: MismatchStrategy,
    pub fit: FitResult,
}
