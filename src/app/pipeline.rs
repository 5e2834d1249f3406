//! Shared fit pipeline used by the `fit` and `demo` commands.
//!
//! measurements -> validation/reconciliation -> statistics -> fit -> lines
//!
//! Presentation (printing, reports, exports) stays in `app`.

use tracing::info_span;

use crate::domain::{FitLines, FitResult, MismatchStrategy, SampleSet, SampleStatistics};
use crate::error::AppError;
use crate::fit::{fit_samples, normalize, project, statistics};
use crate::io::ingest::Measurements;

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub samples: SampleSet,
    pub statistics: SampleStatistics,
    pub fit: FitResult,
    pub lines: FitLines,
}

/// Execute the fitting pipeline on raw measurements.
pub fn run_fit(measurements: &Measurements, strategy: MismatchStrategy) -> Result<RunOutput, AppError> {
    let _span = info_span!("fit", source = %measurements.source, %strategy).entered();

    let samples = normalize(&measurements.abscissa, &measurements.ordinates, strategy)?;
    let statistics = statistics(&samples);
    let fit = fit_samples(&samples)?;
    let lines = project(samples.abscissa(), samples.ordinates(), Some(&fit))?;

    Ok(RunOutput {
        samples,
        statistics,
        fit,
        lines,
    })
}
