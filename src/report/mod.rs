//! Reporting: render a fit as text and optionally persist it.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::domain::{FitResult, ReportConfig};
use crate::error::{LsmError, Result};

pub mod format;

pub use format::*;

/// Renders fit reports with a fixed precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ReportConfig {
        self.config
    }

    /// Render the report and, for a non-empty `destination`, write it there.
    ///
    /// The text is rendered before the file is touched. If the write fails the
    /// returned `LsmError::ReportWrite` still carries it.
    pub fn render(&self, fit: &FitResult, destination: Option<&Path>) -> Result<String> {
        let text = format_report(fit, self.config.precision);

        if let Some(path) = destination.filter(|p| !p.as_os_str().is_empty()) {
            persist(path, &text).map_err(|e| {
                warn!(path = %path.display(), error = %e, "report write failed");
                LsmError::ReportWrite {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                    report: text.clone(),
                }
            })?;
            info!(path = %path.display(), bytes = text.len(), "report written");
        }

        Ok(text)
    }
}

fn persist(path: &Path, text: &str) -> std::io::Result<()> {
    // The handle is dropped (and closed) on every return path.
    let mut file = File::create(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()
}
