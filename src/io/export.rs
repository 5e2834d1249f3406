//! Export projected lines to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or plotting scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::FitLines;
use crate::error::AppError;

/// Write `x,y,predicted,upper,lower` rows.
///
/// Rows run to the longest series; a series that ran out leaves its cell empty.
pub fn write_lines_csv(path: &Path, lines: &FitLines) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create lines CSV '{}': {e}", path.display())))?;
    write_lines(file, lines)
        .map_err(|e| AppError::new(4, format!("Failed to write lines CSV '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = lines.len(), "lines exported");
    Ok(())
}

fn write_lines<W: Write>(mut out: W, lines: &FitLines) -> std::io::Result<()> {
    writeln!(out, "x,y,predicted,upper,lower")?;

    let columns = [
        &lines.abscissa,
        &lines.ordinates,
        &lines.predicted,
        &lines.upper,
        &lines.lower,
    ];
    let rows = columns.iter().map(|c| c.len()).max().unwrap_or(0);

    for i in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| c.get(i).map(|v| format!("{v:.10}")).unwrap_or_default())
            .collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    out.flush()
}
