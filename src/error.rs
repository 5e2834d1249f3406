//! Error types.
//!
//! - `LsmError`: the library taxonomy returned by fitting, projection and reporting.
//! - `AppError`: what the `lsm` binary reports, carrying a process exit code.
//!
//! Exit codes:
//! - 2: bad input or usage
//! - 3: numerically unusable data
//! - 4: I/O failure

use std::path::PathBuf;

use thiserror::Error;

/// Which of the two measurement sequences an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Abscissa,
    Ordinates,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Abscissa => write!(f, "abscissa"),
            Axis::Ordinates => write!(f, "ordinates"),
        }
    }
}

/// Failures of the least-squares pipeline.
#[derive(Debug, Clone, Error)]
pub enum LsmError {
    /// The input could not be turned into a sequence of numbers at all.
    #[error("Cannot convert {what} to a numeric sequence: {reason}")]
    TypeConversion { what: String, reason: String },

    /// A single element is not a finite real number.
    #[error("Invalid sample in {axis} at index {index}: {value}")]
    InvalidSample {
        axis: Axis,
        index: usize,
        value: String,
    },

    #[error("Length mismatch: {abscissa} abscissa values vs {ordinates} ordinates")]
    LengthMismatch { abscissa: usize, ordinates: usize },

    #[error("Unsupported mismatch strategy '{0}' (expected 'fail' or 'truncate')")]
    UnsupportedStrategy(String),

    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The abscissa has no spread, so the slope is undefined.
    #[error("Degenerate input: abscissa has zero variance (first value {value})")]
    DegenerateInput { value: f64 },

    /// Finite measurements whose moments or fit parameters do not fit in an `f64`.
    #[error("Numerical overflow: {quantity} of the measurements is not finite")]
    Overflow { quantity: &'static str },

    /// A supplied fit result is not usable (non-finite field or negative error term).
    #[error("Invalid fit result: {0}")]
    InvalidFitResult(String),

    /// The report was rendered but could not be persisted.
    ///
    /// The rendered text travels with the error; see [`LsmError::recovered_report`].
    #[error("Failed to write report '{}': {message}", .path.display())]
    ReportWrite {
        path: PathBuf,
        message: String,
        report: String,
    },
}

impl LsmError {
    /// The report text that was rendered before a failed write, if any.
    pub fn recovered_report(&self) -> Option<&str> {
        match self {
            LsmError::ReportWrite { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            LsmError::TypeConversion { .. }
            | LsmError::InvalidSample { .. }
            | LsmError::LengthMismatch { .. }
            | LsmError::UnsupportedStrategy(_)
            | LsmError::InvalidFitResult(_) => 2,
            LsmError::InsufficientData { .. }
            | LsmError::DegenerateInput { .. }
            | LsmError::Overflow { .. } => 3,
            LsmError::ReportWrite { .. } => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, LsmError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<LsmError> for AppError {
    fn from(err: LsmError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
