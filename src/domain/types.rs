//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during feature construction and fitting
//! - exported to JSON/CSV
//! - reloaded later for prediction without retraining

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Regression target column: realized percentage move across an earnings event.
pub const TARGET_COL: &str = "price_change_pct";
/// Explanatory feature: reported earnings per share.
pub const EPS_COL: &str = "eps";
/// Explanatory feature: volatility-index level as of the event date.
pub const VIX_COL: &str = "vix_level";
/// Implicit leading design-matrix column of ones.
pub const INTERCEPT_COL: &str = "intercept";

/// One close observation of the stock price series.
///
/// Loaders guarantee the series handed to the core is sorted ascending and
/// unique by date; the aligner relies on both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// One close observation of the volatility-index series.
///
/// Same shape and ordering rules as [`PricePoint`], kept as a separate type so
/// the two series cannot be swapped by accident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// A scheduled earnings announcement with its reported EPS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarningsEvent {
    pub date: NaiveDate,
    pub eps: f64,
}

/// An earnings event aligned to its surrounding trading days.
///
/// Exists only if the price series has a trading day strictly before *and*
/// strictly after the event date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedObservation {
    pub date: NaiveDate,
    /// `(after_close - before_close) / before_close * 100`.
    pub change_pct: f64,
    pub eps: f64,
}

/// An aligned observation with its volatility context attached.
///
/// The unit of training data. A dataset is a `Vec<FeatureRow>` sorted
/// ascending by earnings date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub change_pct: f64,
    pub eps: f64,
    pub vix_level: f64,
}

impl FeatureRow {
    /// Look up a column by its canonical name.
    pub fn value(&self, column: &str) -> Option<f64> {
        match column {
            TARGET_COL => Some(self.change_pct),
            EPS_COL => Some(self.eps),
            VIX_COL => Some(self.vix_level),
            _ => None,
        }
    }
}

/// Fit diagnostics returned by `OlsModel::fit` and appended to the metrics log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    /// In-sample R² over the training partition.
    pub train_r2: f64,
    /// Out-of-sample R² over the test partition.
    ///
    /// `None` when the test target variance is exactly zero (R² undefined).
    pub test_r2: Option<f64>,
    pub n_train: usize,
    pub n_test: usize,
    /// Coefficient per design column, intercept included.
    pub coef: BTreeMap<String, f64>,
}

/// Training settings for the linear predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub target_col: String,
    pub feature_cols: Vec<String>,
    /// Fraction of rows held out for evaluation, in `(0, 1)`.
    pub test_fraction: f64,
    /// Seed for the deterministic train/test shuffle.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            target_col: TARGET_COL.to_string(),
            feature_cols: vec![EPS_COL.to_string(), VIX_COL.to_string()],
            test_fraction: 0.25,
            seed: 42,
        }
    }
}

/// Where the price/volatility series come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Fetch daily closes from the remote chart endpoint.
    Remote,
    /// Generate a deterministic synthetic sample (offline-friendly).
    Sample,
    /// Load both series from local CSV files.
    Csv { stock: PathBuf, vix: PathBuf },
}

/// Categorical pre-earnings recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Buy,
    Hold,
    Avoid,
}

impl Recommendation {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Avoid => "AVOID",
        }
    }
}

/// Row counts before and after dataset construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSummary {
    pub events_parsed: usize,
    pub rows: usize,
}

/// The single forward prediction produced at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextEarningsSignal {
    pub last_earnings: NaiveDate,
    /// Display-only estimate: last earnings date + 90 days.
    pub est_next_earnings: NaiveDate,
    /// EPS of the last earnings event.
    pub eps: f64,
    /// Volatility level as of the last earnings date.
    pub vix_level: f64,
    pub predicted_pct: f64,
    pub recommendation: Recommendation,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub ticker: String,
    pub vix_symbol: String,
    pub start: NaiveDate,
    /// End of the analysis range, supplied by the caller (never computed
    /// inside the core).
    pub end: NaiveDate,
    /// Earnings list to parse. `None` is only valid for the sample source,
    /// which generates synthetic events instead.
    pub earnings_path: Option<PathBuf>,
    pub source: DataSource,
    /// Seed for the synthetic sample generator (sample source only).
    pub sample_seed: u64,
    /// Symmetric neutral band (±%) for the recommendation rule.
    pub neutral_band_pct: f64,
    pub train: TrainConfig,

    pub model_out: Option<PathBuf>,
    pub metrics_log: Option<PathBuf>,
    pub export: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_row_lookup_by_column_name() {
        let row = FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            change_pct: 10.0,
            eps: 1.5,
            vix_level: 20.0,
        };
        assert_eq!(row.value(TARGET_COL), Some(10.0));
        assert_eq!(row.value(EPS_COL), Some(1.5));
        assert_eq!(row.value(VIX_COL), Some(20.0));
        assert_eq!(row.value("volume"), None);
    }

    #[test]
    fn default_train_config_matches_the_study_design() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.target_col, TARGET_COL);
        assert_eq!(cfg.feature_cols, vec![EPS_COL, VIX_COL]);
        assert!((cfg.test_fraction - 0.25).abs() < 1e-12);
        assert_eq!(cfg.seed, 42);
    }
}
