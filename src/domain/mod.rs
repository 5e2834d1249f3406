//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the mismatch policy (`MismatchStrategy`)
//! - validated measurements and their moments (`SampleSet`, `SampleStatistics`)
//! - fit outputs (`FitResult`, `FitLines`, `FitFile`)
//! - run configuration (`FitConfig`, `ReportConfig`, `SampleConfig`)

pub mod types;

pub use types::*;
