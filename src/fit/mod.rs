//! Line fitting.
//!
//! Responsibilities:
//!
//! - validate and reconcile measurements (`estimator::normalize`)
//! - estimate slope, intercept and their errors (`estimator::fit`)
//! - project the fitted line and error band (`lines::project`)

pub mod estimator;
pub mod lines;

pub use estimator::{fit, fit_samples, normalize, statistics};
pub use lines::project;
