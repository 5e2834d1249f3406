//! Process-wide settings loaded once from the environment (and `.env`).
//!
//! | variable        | meaning                                   | default         |
//! |-----------------|-------------------------------------------|-----------------|
//! | `LSM_PRECISION` | decimals in rendered reports (0..=12)     | 3               |
//! | `LSM_STRATEGY`  | default mismatch strategy                 | `fail`          |
//! | `LSM_LOG`       | tracing filter when `RUST_LOG` is unset   | `lsm_fit=info`  |
//!
//! CLI flags take precedence over these values.

use crate::domain::{DEFAULT_PRECISION, MismatchStrategy};
use crate::error::AppError;

pub const DEFAULT_LOG_FILTER: &str = "lsm_fit=info";
const MAX_PRECISION: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub precision: usize,
    pub strategy: MismatchStrategy,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            strategy: MismatchStrategy::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Settings::default();

        if let Some(raw) = lookup("LSM_PRECISION") {
            settings.precision = parse_precision(&raw)
                .map_err(|msg| AppError::new(2, format!("Invalid LSM_PRECISION: {msg}")))?;
        }
        if let Some(raw) = lookup("LSM_STRATEGY") {
            settings.strategy = raw
                .parse()
                .map_err(|e| AppError::new(2, format!("Invalid LSM_STRATEGY: {e}")))?;
        }
        if let Some(raw) = lookup("LSM_LOG").filter(|s| !s.trim().is_empty()) {
            settings.log_filter = raw;
        }

        Ok(settings)
    }
}

/// Parse and bound a precision value (shared with the `--precision` flag).
pub fn parse_precision(raw: &str) -> Result<usize, String> {
    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a non-negative integer"))?;
    if value > MAX_PRECISION {
        return Err(format!("{value} exceeds the maximum of {MAX_PRECISION}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.precision, 3);
        assert_eq!(settings.strategy, MismatchStrategy::Fail);
    }

    #[test]
    fn reads_all_variables() {
        let settings = Settings::from_lookup(lookup(&[
            ("LSM_PRECISION", "5"),
            ("LSM_STRATEGY", "truncate"),
            ("LSM_LOG", "lsm_fit=debug"),
        ]))
        .unwrap();
        assert_eq!(settings.precision, 5);
        assert_eq!(settings.strategy, MismatchStrategy::Truncate);
        assert_eq!(settings.log_filter, "lsm_fit=debug");
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = Settings::from_lookup(lookup(&[("LSM_STRATEGY", "cut")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Unsupported mismatch strategy 'cut'"));
    }

    #[test]
    fn precision_bounds() {
        assert_eq!(parse_precision(" 0 "), Ok(0));
        assert!(parse_precision("13").is_err());
        assert!(parse_precision("-1").is_err());
        assert!(Settings::from_lookup(lookup(&[("LSM_PRECISION", "abc")])).is_err());
    }
}
