//! `lsm-fit` library crate.
//!
//! Ordinary least-squares fit of `y = slope·x + intercept` with standard errors
//! for both parameters, projected error-band lines and a fixed-layout report.
//!
//! The binary (`lsm`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimator, projector and reporter are reusable on their own

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;

pub use domain::{FitLines, FitResult, MismatchStrategy, ReportConfig, SampleSet};
pub use error::{LsmError, Result};
pub use fit::{fit, project};
pub use report::Reporter;
