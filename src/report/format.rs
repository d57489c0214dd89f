//! Formatted terminal output for a run.

use crate::domain::{
    DatasetSummary, FeatureRow, FitMetrics, NextEarningsSignal, RunConfig,
};

/// Format the full run summary (inputs + fit diagnostics + prediction).
pub fn format_run_summary(
    config: &RunConfig,
    summary: &DatasetSummary,
    metrics: &FitMetrics,
    latest: &NextEarningsSignal,
) -> String {
    let mut out = String::new();

    out.push_str("=== ti - Earnings Event Study ===\n");
    out.push_str(&format!("Ticker: {}\n", config.ticker));
    out.push_str(&format!("Range: {} → {}\n", config.start, config.end));
    out.push_str(&format!("Volatility symbol: {}\n", config.vix_symbol));
    out.push_str(&format!(
        "Events: parsed={} | dataset rows={}\n",
        summary.events_parsed, summary.rows
    ));

    out.push_str("\nFit (OLS):\n");
    let test_r2 = metrics
        .test_r2
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "n/a".to_string());
    out.push_str(&format!(
        "  train R²={:.4} | test R²={test_r2} | n_train={} n_test={}\n",
        metrics.train_r2, metrics.n_train, metrics.n_test
    ));
    out.push_str("  coefficients:\n");
    for (column, weight) in &metrics.coef {
        out.push_str(&format!("    {column:<12} = {weight:+.6}\n"));
    }

    out.push_str(&format!(
        "\nNext earnings (est. {}):\n",
        latest.est_next_earnings
    ));
    out.push_str(&format!(
        "  inputs → eps={:.2} | vix={:.1} (as of {})\n",
        latest.eps, latest.vix_level, latest.last_earnings
    ));
    out.push_str(&format!(
        "  predicted move = {:+.2}%\n",
        latest.predicted_pct
    ));
    out.push_str(&format!(
        "  recommendation = {} (band ±{:.2}%)\n",
        latest.recommendation.display_name(),
        config.neutral_band_pct
    ));

    out
}

/// Format the dataset as an aligned table.
pub fn format_dataset_table(rows: &[FeatureRow]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<12} {:>12} {:>8} {:>10}\n",
        "date", "change_pct", "eps", "vix_level"
    ));
    out.push_str(&format!(
        "{:-<12} {:-<12} {:-<8} {:-<10}\n",
        "", "", "", ""
    ));

    for row in rows {
        out.push_str(&format!(
            "{:<12} {:>12.4} {:>8.2} {:>10.2}\n",
            row.date.to_string(),
            row.change_pct,
            row.eps,
            row.vix_level
        ));
    }

    out
}
