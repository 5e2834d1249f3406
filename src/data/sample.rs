//! Synthetic measurements around a known line.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::SampleConfig;
use crate::error::AppError;
use crate::io::ingest::Measurements;

/// Draw `config.count` points with x uniform on `[x_min, x_max]` and
/// `y = slope·x + intercept + N(0, noise)`.
///
/// Abscissa values are sorted so plots and exports read left to right.
pub fn generate_sample(config: &SampleConfig) -> Result<Measurements, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::new(2, "Invalid abscissa range for sample generation."));
    }
    if !(config.slope.is_finite() && config.intercept.is_finite()) {
        return Err(AppError::new(2, "Sample line parameters must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;

    let mut abscissa: Vec<f64> = (0..config.count)
        .map(|_| rng.gen_range(config.x_min..=config.x_max))
        .collect();
    abscissa.sort_by(f64::total_cmp);

    let ordinates = abscissa
        .iter()
        .map(|&x| config.slope * x + config.intercept + normal.sample(&mut rng))
        .collect();

    Ok(Measurements {
        abscissa,
        ordinates,
        source: format!(
            "synthetic (n={}, slope={}, intercept={}, noise={}, seed={})",
            config.count, config.slope, config.intercept, config.noise, config.seed
        ),
    })
}
