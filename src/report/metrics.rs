//! Metrics logging: one JSON object per training run, appended as a line.
//!
//! The timestamp is supplied by the caller (the application layer reads the
//! clock; the core never does), which keeps every function here deterministic
//! under test.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::FitMetrics;
use crate::error::AppError;

#[derive(Serialize)]
struct MetricsRecord<'a> {
    ts: i64,
    #[serde(flatten)]
    metrics: &'a FitMetrics,
}

/// Append one metrics record to a JSONL log, creating parent directories and
/// the file as needed.
pub fn append_metrics_jsonl(path: &Path, metrics: &FitMetrics, ts: i64) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config(format!(
                    "Failed to create metrics directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
    }

    let line = serde_json::to_string(&MetricsRecord { ts, metrics })
        .map_err(|e| AppError::config(format!("Failed to encode metrics record: {e}")))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            AppError::config(format!(
                "Failed to open metrics log '{}': {e}",
                path.display()
            ))
        })?;

    writeln!(file, "{line}")
        .map_err(|e| AppError::config(format!("Failed to append metrics record: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn appends_single_line_records_with_null_for_undefined_test_r2() {
        let metrics = FitMetrics {
            train_r2: 0.42,
            test_r2: None,
            n_train: 8,
            n_test: 3,
            coef: BTreeMap::from([
                ("intercept".to_string(), 0.5),
                ("eps".to_string(), 2.25),
            ]),
        };

        let path = std::env::temp_dir().join(format!("ti-metrics-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        append_metrics_jsonl(&path, &metrics, 1_700_000_000).unwrap();
        append_metrics_jsonl(&path, &metrics, 1_700_000_001).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["ts"], 1_700_000_000_i64);
        assert!((record["train_r2"].as_f64().unwrap() - 0.42).abs() < 1e-12);
        assert!(record["test_r2"].is_null());
        assert_eq!(record["n_train"], 8);
        assert!((record["coef"]["eps"].as_f64().unwrap() - 2.25).abs() < 1e-12);
    }
}
