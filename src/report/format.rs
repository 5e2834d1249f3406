//! Text formatting for reports and terminal summaries.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (the report layout is consumed by other tools)

use crate::domain::{FitLines, FitResult, MismatchStrategy, SampleStatistics};

const REPORT_TITLE: &str = "LSM computing result";
const BANNER_SIDE: usize = 40;
const BANNER_WIDTH: usize = 100;

/// Fixed-layout report: banner, four labeled values, closing banner.
///
/// No trailing newline, so the output is byte-for-byte what gets persisted.
pub fn format_report(fit: &FitResult, precision: usize) -> String {
    let side = "=".repeat(BANNER_SIDE);
    let mut out = String::new();

    out.push_str(&format!("{side}{REPORT_TITLE}{side}\n"));
    out.push('\n');
    for (label, value) in report_fields(fit) {
        out.push_str(&format!("{label}: {value:.precision$};\n"));
    }
    out.push('\n');
    out.push_str(&"=".repeat(BANNER_WIDTH));

    out
}

fn report_fields(fit: &FitResult) -> [(&'static str, f64); 4] {
    [
        ("slope", fit.slope),
        ("intercept", fit.intercept),
        ("slope error", fit.slope_error),
        ("intercept error", fit.intercept_error),
    ]
}

/// One-paragraph summary of what went into a fit.
pub fn format_sample_summary(stats: &SampleStatistics, strategy: MismatchStrategy, source: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Input: {source}\n"));
    out.push_str(&format!("Points: n={} | strategy={strategy}\n", stats.n));
    out.push_str(&format!(
        "Means: x={:.6} y={:.6} xy={:.6} x^2={:.6}\n",
        stats.abscissa_mean, stats.ordinate_mean, stats.product_mean, stats.abscissa_squared_mean
    ));
    out
}

/// Aligned table of projected lines, one row per abscissa value.
pub fn format_lines_table(lines: &FitLines, precision: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>12} {:>12} {:>12} {:>12} {:>12}",
            "x", "y", "predicted", "upper", "lower"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<12} {:-<12} {:-<12} {:-<12} {:-<12}\n",
        "", "", "", "", ""
    ));

    for i in 0..lines.len() {
        let cell = |values: &[f64]| {
            values
                .get(i)
                .map(|v| format!("{v:>12.precision$}"))
                .unwrap_or_else(|| format!("{:>12}", "-"))
        };
        out.push_str(&format!(
            "{} {} {} {} {}\n",
            cell(&lines.abscissa),
            cell(&lines.ordinates),
            cell(&lines.predicted),
            cell(&lines.upper),
            cell(&lines.lower),
        ));
    }

    out
}
