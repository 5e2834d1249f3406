//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads settings and installs logging
//! - parses CLI arguments
//! - loads or generates measurements
//! - runs the fit pipeline
//! - prints the report/plots and writes optional exports

use std::path::Path;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, DemoArgs, FitArgs, LinesArgs, OutputArgs};
use crate::config::{DEFAULT_LOG_FILTER, Settings};
use crate::domain::{FitConfig, ReportConfig, SampleConfig};
use crate::error::AppError;
use crate::io::ingest::Measurements;
use crate::report::Reporter;

pub mod pipeline;

const DEBUG_DIR: &str = "debug";

/// Entry point for the `lsm` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    let settings = Settings::from_env()?;
    init_logging(&settings);

    match cli.command {
        Command::Fit(args) => handle_fit(args, &settings),
        Command::Lines(args) => handle_lines(args, &settings),
        Command::Demo(args) => handle_demo(args, &settings),
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries the report.
fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // A second call (e.g. from tests driving `run`) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn handle_fit(args: FitArgs, settings: &Settings) -> Result<(), AppError> {
    let measurements = crate::io::ingest::load_measurements(&args.input.input)?;
    let config = fit_config_from_args(&args.output, settings);
    fit_and_present(&measurements, &config)
}

fn handle_demo(args: DemoArgs, settings: &Settings) -> Result<(), AppError> {
    let sample_config = SampleConfig {
        count: args.count,
        slope: args.slope,
        intercept: args.intercept,
        noise: args.noise,
        x_min: args.x_min,
        x_max: args.x_max,
        seed: args.seed,
    };
    let measurements = crate::data::generate_sample(&sample_config)?;
    let config = fit_config_from_args(&args.output, settings);
    fit_and_present(&measurements, &config)
}

fn handle_lines(args: LinesArgs, settings: &Settings) -> Result<(), AppError> {
    let measurements = crate::io::ingest::load_measurements(&args.input.input)?;
    let saved = args
        .fit
        .as_deref()
        .map(crate::io::fit_file::read_fit_json)
        .transpose()?;

    let lines = crate::fit::project(
        &measurements.abscissa,
        &measurements.ordinates,
        saved.as_ref().map(|f| &f.fit),
    )?;

    match &args.export {
        Some(path) => crate::io::export::write_lines_csv(path, &lines)?,
        None => {
            let precision = args.precision.unwrap_or(settings.precision);
            print!("{}", crate::report::format_lines_table(&lines, precision));
        }
    }

    if args.plot {
        println!();
        print!("{}", crate::plot::render_lines_plot(&lines, args.width, args.height));
    }

    Ok(())
}

fn fit_and_present(measurements: &Measurements, config: &FitConfig) -> Result<(), AppError> {
    let run = pipeline::run_fit(measurements, config.strategy)?;

    println!(
        "{}",
        crate::report::format_sample_summary(&run.statistics, config.strategy, &measurements.source)
    );

    let reporter = Reporter::new(config.report);
    let report = match reporter.render(&run.fit, config.report_path.as_deref()) {
        Ok(text) => text,
        Err(err) => {
            // The report is still shown even though it could not be saved.
            if let Some(text) = err.recovered_report() {
                println!("{text}");
            }
            return Err(err.into());
        }
    };
    println!("{report}");

    if config.plot {
        println!();
        print!(
            "{}",
            crate::plot::render_lines_plot(&run.lines, config.plot_width, config.plot_height)
        );
    }

    // Optional exports.
    if let Some(path) = &config.export_lines {
        crate::io::export::write_lines_csv(path, &run.lines)?;
    }
    if let Some(path) = &config.export_fit {
        crate::io::fit_file::write_fit_json(path, &run.fit, run.samples.len(), config.strategy)?;
    }
    if config.debug {
        match crate::debug::write_debug_bundle(Path::new(DEBUG_DIR), measurements, &run, config.strategy) {
            Ok(path) => eprintln!("Debug bundle: {}", path.display()),
            Err(err) => warn!(error = %err, "debug bundle not written"),
        }
    }

    Ok(())
}

pub fn fit_config_from_args(args: &OutputArgs, settings: &Settings) -> FitConfig {
    FitConfig {
        strategy: args.strategy.unwrap_or(settings.strategy),
        report: ReportConfig {
            precision: args.precision.unwrap_or(settings.precision),
        },
        report_path: args.report.clone(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_lines: args.export_lines.clone(),
        export_fit: args.export_fit.clone(),
        debug: args.debug,
    }
}
