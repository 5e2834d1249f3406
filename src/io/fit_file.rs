//! Read/write fit JSON files.
//!
//! A fit file lets `lsm lines --fit` reuse parameters from an earlier run.
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::domain::{FitFile, FitResult, MismatchStrategy};
use crate::error::{AppError, LsmError};

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, fit: &FitResult, n: usize, strategy: MismatchStrategy) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    let contents = FitFile {
        tool: "lsm".to_string(),
        created_at: Utc::now(),
        n,
        strategy,
        fit: *fit,
    };

    serde_json::to_writer_pretty(file, &contents)
        .map_err(|e| AppError::new(4, format!("Failed to write fit JSON: {e}")))?;

    info!(path = %path.display(), "fit exported");
    Ok(())
}

/// Read a fit JSON file.
///
/// A file that parses but holds an unusable fit is rejected as `InvalidFitResult`.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    let contents: FitFile = serde_json::from_reader(file)
        .map_err(|e| AppError::from(LsmError::InvalidFitResult(format!("'{}': {e}", path.display()))))?;
    contents.fit.validate()?;
    Ok(contents)
}
