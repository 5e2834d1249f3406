//! Measurement ingest: the single boundary where raw input becomes numbers.
//!
//! Two file formats are accepted:
//! - CSV with a header naming the abscissa (`x` or `abscissa`) and ordinate
//!   (`y`, `ordinate` or `ordinates`) columns
//! - JSON of the form `{"abscissa": [...], "ordinates": [...]}` (`x`/`y` also accepted)
//!
//! Columns may have different lengths (trailing empty cells), so the mismatch
//! strategy stays meaningful for file input. Everything else about the values
//! is left to the estimator.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AppError, Axis, LsmError};

const ABSCISSA_NAMES: [&str; 2] = ["x", "abscissa"];
const ORDINATE_NAMES: [&str; 3] = ["y", "ordinates", "ordinate"];

/// Raw measurement columns, not yet validated or reconciled.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    pub abscissa: Vec<f64>,
    pub ordinates: Vec<f64>,
    /// Where the values came from (path or description), for summaries.
    pub source: String,
}

/// Load measurements from a `.json` or CSV file.
pub fn load_measurements(path: &Path) -> Result<Measurements, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;
    let source = path.display().to_string();

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let measurements = if is_json {
        let value: Value = serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid JSON in '{source}': {e}")))?;
        measurements_from_json(&value, &source)?
    } else {
        measurements_from_csv(file, &source)?
    };

    debug!(
        source = %measurements.source,
        abscissa = measurements.abscissa.len(),
        ordinates = measurements.ordinates.len(),
        "loaded measurements"
    );
    Ok(measurements)
}

/// Convert one JSON value into a numeric sequence.
///
/// Anything that is not an array fails with `TypeConversion`; an array element
/// that is not a number fails with `InvalidSample`.
pub fn numeric_sequence(axis: Axis, value: &Value) -> Result<Vec<f64>, LsmError> {
    sequence_from_json(axis, value).map_err(rejected)
}

fn sequence_from_json(axis: Axis, value: &Value) -> Result<Vec<f64>, LsmError> {
    let items = value.as_array().ok_or_else(|| LsmError::TypeConversion {
        what: axis.to_string(),
        reason: format!("expected an array, found {}", json_kind(value)),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_f64().ok_or_else(|| LsmError::InvalidSample {
                axis,
                index,
                value: item.to_string(),
            })
        })
        .collect()
}

/// Read measurements from a JSON document.
pub fn measurements_from_json(value: &Value, source: &str) -> Result<Measurements, LsmError> {
    read_json(value, source).map_err(rejected)
}

fn read_json(value: &Value, source: &str) -> Result<Measurements, LsmError> {
    let object = value.as_object().ok_or_else(|| LsmError::TypeConversion {
        what: source.to_string(),
        reason: format!("expected an object with abscissa/ordinates, found {}", json_kind(value)),
    })?;

    let field = |axis: Axis, names: &[&str]| {
        names
            .iter()
            .find_map(|name| object.get(*name))
            .ok_or_else(|| LsmError::TypeConversion {
                what: source.to_string(),
                reason: format!("missing `{}` field", names[0]),
            })
            .and_then(|v| sequence_from_json(axis, v))
    };

    Ok(Measurements {
        abscissa: field(Axis::Abscissa, &["abscissa", "x"])?,
        ordinates: field(Axis::Ordinates, &["ordinates", "y"])?,
        source: source.to_string(),
    })
}

/// Read measurements from CSV with a header row.
pub fn measurements_from_csv<R: Read>(reader: R, source: &str) -> Result<Measurements, LsmError> {
    read_csv(reader, source).map_err(rejected)
}

fn read_csv<R: Read>(reader: R, source: &str) -> Result<Measurements, LsmError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| LsmError::TypeConversion {
            what: source.to_string(),
            reason: format!("failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map = build_header_map(&headers);

    let x_idx = find_column(&header_map, &ABSCISSA_NAMES, source)?;
    let y_idx = find_column(&header_map, &ORDINATE_NAMES, source)?;

    let mut abscissa = Column::new(Axis::Abscissa);
    let mut ordinates = Column::new(Axis::Ordinates);

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| LsmError::TypeConversion {
            what: source.to_string(),
            reason: format!("CSV parse error on line {line}: {e}"),
        })?;

        abscissa.push(record.get(x_idx))?;
        ordinates.push(record.get(y_idx))?;
    }

    Ok(Measurements {
        abscissa: abscissa.values,
        ordinates: ordinates.values,
        source: source.to_string(),
    })
}

/// One CSV column; empty cells are only allowed at the end.
struct Column {
    axis: Axis,
    values: Vec<f64>,
    /// Row index of the first empty cell, if any.
    ended_at: Option<usize>,
    rows: usize,
}

impl Column {
    fn new(axis: Axis) -> Self {
        Self {
            axis,
            values: Vec::new(),
            ended_at: None,
            rows: 0,
        }
    }

    fn push(&mut self, cell: Option<&str>) -> Result<(), LsmError> {
        let row = self.rows;
        self.rows += 1;

        let cell = cell.unwrap_or("");
        if cell.is_empty() {
            self.ended_at.get_or_insert(row);
            return Ok(());
        }
        if let Some(gap) = self.ended_at {
            return Err(LsmError::InvalidSample {
                axis: self.axis,
                index: gap,
                value: "<empty>".to_string(),
            });
        }

        let value = cell.parse::<f64>().map_err(|_| LsmError::InvalidSample {
            axis: self.axis,
            index: row,
            value: cell.to_string(),
        })?;
        self.values.push(value);
        Ok(())
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str], source: &str) -> Result<usize, LsmError> {
    names
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| LsmError::TypeConversion {
            what: source.to_string(),
            reason: format!("missing column: one of {}", names.join(", ")),
        })
}

fn rejected(err: LsmError) -> LsmError {
    warn!(event = "conversion_failed", error = %err, "rejected input");
    err
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Counts `WARN` events seen while it is the active subscriber.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn warnings_during(f: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, f);
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn csv_with_aliases_and_bom() {
        let data = "\u{feff}Abscissa,ordinates\n1,2\n2,4.5\n3,6\n";
        let m = measurements_from_csv(data.as_bytes(), "inline").unwrap();
        assert_eq!(m.abscissa, vec![1.0, 2.0, 3.0]);
        assert_eq!(m.ordinates, vec![2.0, 4.5, 6.0]);
        assert_eq!(m.source, "inline");
    }

    #[test]
    fn csv_columns_may_end_early() {
        let data = "x,y\n1,1\n2,2\n3,3\n4,\n";
        let m = measurements_from_csv(data.as_bytes(), "inline").unwrap();
        assert_eq!(m.abscissa.len(), 4);
        assert_eq!(m.ordinates.len(), 3);
    }

    #[test]
    fn csv_gap_inside_column_is_invalid() {
        let data = "x,y\n1,1\n2,\n3,3\n";
        let err = measurements_from_csv(data.as_bytes(), "inline").unwrap_err();
        assert!(matches!(
            err,
            LsmError::InvalidSample {
                axis: Axis::Ordinates,
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn csv_non_numeric_cell_is_invalid() {
        let data = "x,y\n1,1\nabc,2\n";
        let err = measurements_from_csv(data.as_bytes(), "inline").unwrap_err();
        assert!(matches!(
            err,
            LsmError::InvalidSample {
                axis: Axis::Abscissa,
                index: 1,
                ref value
            } if value == "abc"
        ));
    }

    #[test]
    fn csv_missing_column_is_conversion_error() {
        let data = "a,b\n1,2\n";
        let err = measurements_from_csv(data.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, LsmError::TypeConversion { .. }));
    }

    #[test]
    fn json_sequences_accept_integers_and_floats() {
        let value = json!({"abscissa": [1, 2.5, 3], "ordinates": [-1, 0, 1e3]});
        let m = measurements_from_json(&value, "inline").unwrap();
        assert_eq!(m.abscissa, vec![1.0, 2.5, 3.0]);
        assert_eq!(m.ordinates, vec![-1.0, 0.0, 1000.0]);
    }

    #[test]
    fn json_short_field_names() {
        let value = json!({"x": [1, 2, 3], "y": [3, 2, 1]});
        let m = measurements_from_json(&value, "inline").unwrap();
        assert_eq!(m.ordinates, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn json_non_array_is_conversion_error() {
        let err = numeric_sequence(Axis::Abscissa, &json!("1,2,3")).unwrap_err();
        assert!(matches!(err, LsmError::TypeConversion { .. }));

        let err = measurements_from_json(&json!([1, 2, 3]), "inline").unwrap_err();
        assert!(matches!(err, LsmError::TypeConversion { .. }));
    }

    #[test]
    fn json_non_numeric_element_is_invalid_sample() {
        let err = numeric_sequence(Axis::Ordinates, &json!([1, "two", 3])).unwrap_err();
        assert!(matches!(
            err,
            LsmError::InvalidSample {
                axis: Axis::Ordinates,
                index: 1,
                ..
            }
        ));

        let err = numeric_sequence(Axis::Ordinates, &json!([1, null])).unwrap_err();
        assert!(matches!(err, LsmError::InvalidSample { index: 1, .. }));
    }

    #[test]
    fn json_missing_field_is_conversion_error() {
        let err = measurements_from_json(&json!({"abscissa": [1, 2, 3]}), "inline").unwrap_err();
        assert!(matches!(err, LsmError::TypeConversion { ref reason, .. } if reason.contains("ordinates")));
    }

    #[test]
    fn conversion_failures_are_logged_once() {
        let warnings = warnings_during(|| {
            let _ = measurements_from_csv("x,y\n1,1\nabc,2\n".as_bytes(), "inline");
        });
        assert_eq!(warnings, 1);

        let warnings = warnings_during(|| {
            let _ = measurements_from_json(&json!({"x": "1,2,3", "y": [1, 2, 3]}), "inline");
        });
        assert_eq!(warnings, 1);

        let warnings = warnings_during(|| {
            let _ = numeric_sequence(Axis::Ordinates, &json!([1, null]));
        });
        assert_eq!(warnings, 1);
    }

    #[test]
    fn successful_conversion_is_not_logged_as_warning() {
        let warnings = warnings_during(|| {
            measurements_from_csv("x,y\n1,1\n2,2\n3,3\n".as_bytes(), "inline").unwrap();
        });
        assert_eq!(warnings, 0);
    }

    #[test]
    fn load_from_files() {
        let dir = std::env::temp_dir();
        let csv_path = dir.join(format!("lsm_ingest_{}.csv", std::process::id()));
        let json_path = dir.join(format!("lsm_ingest_{}.json", std::process::id()));
        std::fs::write(&csv_path, "x,y\n1,2\n2,3\n3,5\n").unwrap();
        std::fs::write(&json_path, r#"{"abscissa":[1,2,3],"ordinates":[2,3,5]}"#).unwrap();

        let from_csv = load_measurements(&csv_path).unwrap();
        let from_json = load_measurements(&json_path).unwrap();
        assert_eq!(from_csv.abscissa, from_json.abscissa);
        assert_eq!(from_csv.ordinates, from_json.ordinates);

        std::fs::remove_file(&csv_path).ok();
        std::fs::remove_file(&json_path).ok();
    }

    #[test]
    fn load_missing_file_is_usage_error() {
        let err = load_measurements(Path::new("/nonexistent/lsm/input.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
