//! Reporting: formatted terminal output, metrics logging, and alerts.
//!
//! We keep formatting code in one place so:
//! - the feature/model code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;
pub mod metrics;

pub use format::{format_dataset_table, format_run_summary};
pub use metrics::append_metrics_jsonl;

use crate::domain::FitMetrics;

/// Advisory strings derived from fit metrics. Presentation-layer only; the
/// core never prints.
pub fn basic_alerts(metrics: &FitMetrics) -> Vec<String> {
    let mut alerts = Vec::new();
    if let Some(test_r2) = metrics.test_r2 {
        if test_r2 < 0.0 {
            alerts.push("Warning: test R² < 0 suggests poor generalization.".to_string());
        }
    } else {
        alerts.push(
            "Note: test R² is not defined (test partition target has zero variance).".to_string(),
        );
    }
    alerts
}
