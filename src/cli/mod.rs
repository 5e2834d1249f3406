//! Command-line parsing for the `lsm` binary.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting and reporting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::parse_precision;
use crate::domain::MismatchStrategy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lsm", version, about = "Least-squares line fit with slope/intercept errors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a line to measurements from a CSV or JSON file and print the report.
    Fit(FitArgs),
    /// Print (or export) predicted, upper and lower lines for measurements.
    Lines(LinesArgs),
    /// Fit a synthetic sample drawn around a known line.
    Demo(DemoArgs),
}

/// Measurements file.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// CSV (`x`,`y` columns) or JSON (`abscissa`/`ordinates` arrays).
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: PathBuf,
}

/// Options shared by `fit` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// How to handle abscissa/ordinates of different lengths (default: LSM_STRATEGY or fail).
    #[arg(short = 's', long, value_enum)]
    pub strategy: Option<MismatchStrategy>,

    /// Also write the report to this file.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Decimals in the report (default: LSM_PRECISION or 3).
    #[arg(long, value_parser = parse_precision)]
    pub precision: Option<usize>,

    /// Render an ASCII plot of the points, the fitted line and its error band.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export projected lines to CSV.
    #[arg(long = "export-lines", value_name = "CSV")]
    pub export_lines: Option<PathBuf>,

    /// Export the fit to JSON (reusable with `lsm lines --fit`).
    #[arg(long = "export-fit", value_name = "JSON")]
    pub export_fit: Option<PathBuf>,

    /// Write a markdown debug bundle under `debug/`.
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct LinesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Use a fit exported by `lsm fit --export-fit` instead of fitting the input.
    #[arg(long, value_name = "JSON")]
    pub fit: Option<PathBuf>,

    /// Write the lines to CSV instead of printing a table.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Decimals in the printed table (default: LSM_PRECISION or 3).
    #[arg(long, value_parser = parse_precision)]
    pub precision: Option<usize>,

    /// Render an ASCII plot as well.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of synthetic points.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub count: usize,

    /// Slope of the generating line.
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    pub slope: f64,

    /// Intercept of the generating line.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub intercept: f64,

    /// Standard deviation of the Gaussian noise on y.
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    /// Lower bound of the abscissa range.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x_min: f64,

    /// Upper bound of the abscissa range.
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub x_max: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub output: OutputArgs,
}
