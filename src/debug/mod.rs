//! Debug bundle writer for inspecting a fit run.
//!
//! The bundle is a markdown file with the inputs, the sample moments, the fit,
//! an SVD cross-check of the parameters and the projected lines.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use nalgebra::DVector;
use tracing::info;

use crate::app::pipeline::RunOutput;
use crate::domain::MismatchStrategy;
use crate::error::AppError;
use crate::io::ingest::Measurements;
use crate::math::{line_design_matrix, solve_least_squares};

pub fn write_debug_bundle(
    dir: &Path,
    measurements: &Measurements,
    run: &RunOutput,
    strategy: MismatchStrategy,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("lsm_debug_{ts}_n{}.md", run.samples.len()));

    let text = render_bundle(measurements, run, strategy);
    let mut file =
        File::create(&path).map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(text.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;

    info!(path = %path.display(), "debug bundle written");
    Ok(path)
}

fn render_bundle(measurements: &Measurements, run: &RunOutput, strategy: MismatchStrategy) -> String {
    let mut out = String::new();
    let stats = &run.statistics;
    let fit = &run.fit;

    out.push_str("# lsm debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- source: {}\n", measurements.source));
    out.push_str(&format!(
        "- raw lengths: abscissa={} ordinates={}\n",
        measurements.abscissa.len(),
        measurements.ordinates.len()
    ));
    out.push_str(&format!("- strategy: {strategy}\n"));
    out.push_str(&format!("- points used: {}\n", run.samples.len()));

    out.push_str("\n## Moments\n");
    out.push_str("| mean(x) | mean(y) | mean(xy) | mean(x^2) | var(x) |\n");
    out.push_str("| - | - | - | - | - |\n");
    out.push_str(&format!(
        "| {:.6} | {:.6} | {:.6} | {:.6} | {:.6} |\n",
        stats.abscissa_mean,
        stats.ordinate_mean,
        stats.product_mean,
        stats.abscissa_squared_mean,
        stats.abscissa_variance
    ));

    out.push_str("\n## Fit\n");
    out.push_str("| slope | intercept | slope error | intercept error |\n");
    out.push_str("| - | - | - | - |\n");
    out.push_str(&format!(
        "| {:.10} | {:.10} | {:.10} | {:.10} |\n",
        fit.slope, fit.intercept, fit.slope_error, fit.intercept_error
    ));

    out.push_str("\n## SVD cross-check\n");
    let design = line_design_matrix(run.samples.abscissa());
    let y = DVector::from_column_slice(run.samples.ordinates());
    match solve_least_squares(&design, &y) {
        Some(beta) => {
            out.push_str(&format!(
                "- slope: {:.10} (diff {:.3e})\n",
                beta[1],
                beta[1] - fit.slope
            ));
            out.push_str(&format!(
                "- intercept: {:.10} (diff {:.3e})\n",
                beta[0],
                beta[0] - fit.intercept
            ));
        }
        None => out.push_str("- SVD solve failed (ill-conditioned design)\n"),
    }

    out.push_str("\n## Lines\n");
    out.push_str("| x | y | predicted | upper | lower |\n");
    out.push_str("| - | - | - | - | - |\n");
    let lines = &run.lines;
    for i in 0..lines.len() {
        out.push_str(&format!(
            "| {:.6} | {:.6} | {:.6} | {:.6} | {:.6} |\n",
            lines.abscissa[i], lines.ordinates[i], lines.predicted[i], lines.upper[i], lines.lower[i]
        ));
    }

    out
}
