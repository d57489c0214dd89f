//! Ordinary-least-squares predictor for post-earnings moves.
//!
//! The model is a thin state machine: `Unfit -> Fit`, one-way, where a repeat
//! `fit` simply replaces the previous state. Given a dataset it:
//!
//! - splits rows into train/test partitions (seeded, deterministic)
//! - solves the normal-equations problem in closed form via SVD
//! - reports in-sample and out-of-sample R²
//!
//! Prediction reconstructs the fitted column order: the intercept column is
//! implicitly 1.0; a fitted column absent from the supplied features
//! contributes 0.0; supplied features that were never fitted are ignored.

mod split;

pub use split::{SplitIndices, train_test_split};

use std::collections::BTreeMap;
use std::path::Path;

use nalgebra::{DMatrix, DVector};

use crate::domain::{FeatureRow, FitMetrics, INTERCEPT_COL, TrainConfig};
use crate::error::AppError;
use crate::math::solve_least_squares;

/// Fitted model state: design-column order and one weight per column.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCoefficients {
    pub target: String,
    pub columns: Vec<String>,
    pub weights: Vec<f64>,
}

impl FittedCoefficients {
    pub fn coefficient(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.weights[i])
    }
}

/// OLS regression of the target on the configured features plus an intercept.
#[derive(Debug, Clone, Default)]
pub struct OlsModel {
    fitted: Option<FittedCoefficients>,
}

impl OlsModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a model from previously fitted coefficients (see [`Self::load`]).
    pub fn from_coefficients(fitted: FittedCoefficients) -> Self {
        Self { fitted: Some(fitted) }
    }

    pub fn is_fit(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn fitted(&self) -> Option<&FittedCoefficients> {
        self.fitted.as_ref()
    }

    /// Fit on `rows` and return fit diagnostics.
    ///
    /// Deterministic given identical rows and config. Refitting an already-fit
    /// model replaces its state.
    pub fn fit(&mut self, rows: &[FeatureRow], cfg: &TrainConfig) -> Result<FitMetrics, AppError> {
        let split = train_test_split(rows.len(), cfg.test_fraction, cfg.seed)?;

        let (x_train, y_train) = design_matrix(rows, &split.train, cfg)?;
        let (x_test, y_test) = design_matrix(rows, &split.test, cfg)?;

        let beta = solve_least_squares(&x_train, &y_train).ok_or_else(|| {
            AppError::insufficient_data(
                "Design matrix is too ill-conditioned to identify the coefficients.",
            )
        })?;

        let train_r2 = r_squared(&y_train, &(&x_train * &beta)).ok_or_else(|| {
            AppError::insufficient_data(
                "Training target has zero variance; fit quality is undefined.",
            )
        })?;
        // Zero test-target variance leaves test R² undefined; report the
        // explicit sentinel rather than a raw division result.
        let test_r2 = r_squared(&y_test, &(&x_test * &beta));

        let mut columns = Vec::with_capacity(1 + cfg.feature_cols.len());
        columns.push(INTERCEPT_COL.to_string());
        columns.extend(cfg.feature_cols.iter().cloned());
        let weights: Vec<f64> = beta.iter().copied().collect();

        let coef: BTreeMap<String, f64> = columns
            .iter()
            .cloned()
            .zip(weights.iter().copied())
            .collect();

        self.fitted = Some(FittedCoefficients {
            target: cfg.target_col.clone(),
            columns,
            weights,
        });

        Ok(FitMetrics {
            train_r2,
            test_r2,
            n_train: split.train.len(),
            n_test: split.test.len(),
            coef,
        })
    }

    /// Predict a percentage move from named explanatory features.
    pub fn predict(&self, features: &[(&str, f64)]) -> Result<f64, AppError> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| AppError::not_fit("predict called before fit"))?;

        let mut acc = 0.0;
        for (column, weight) in fitted.columns.iter().zip(fitted.weights.iter()) {
            let value = if column == INTERCEPT_COL {
                1.0
            } else {
                features
                    .iter()
                    .find(|(name, _)| *name == column.as_str())
                    .map(|&(_, v)| v)
                    .unwrap_or(0.0)
            };
            acc += weight * value;
        }
        Ok(acc)
    }

    /// Write the fitted coefficients to a JSON artifact.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| AppError::not_fit("save called before fit"))?;
        crate::io::model::write_model_json(path, fitted)
    }

    /// Restore a fit-capable model from a JSON artifact.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let fitted = crate::io::model::read_model_json(path)?;
        Ok(Self::from_coefficients(fitted))
    }
}

fn design_matrix(
    rows: &[FeatureRow],
    indices: &[usize],
    cfg: &TrainConfig,
) -> Result<(DMatrix<f64>, DVector<f64>), AppError> {
    let n = indices.len();
    let p = 1 + cfg.feature_cols.len();

    let mut x = DMatrix::zeros(n, p);
    let mut y = DVector::zeros(n);

    for (r, &idx) in indices.iter().enumerate() {
        let row = &rows[idx];
        y[r] = row.value(&cfg.target_col).ok_or_else(|| {
            AppError::config(format!("Unknown target column '{}'.", cfg.target_col))
        })?;
        x[(r, 0)] = 1.0;
        for (c, col) in cfg.feature_cols.iter().enumerate() {
            x[(r, c + 1)] = row
                .value(col)
                .ok_or_else(|| AppError::config(format!("Unknown feature column '{col}'.")))?;
        }
    }

    Ok((x, y))
}

/// `1 - SS_res / SS_tot`, or `None` when the target variance is exactly zero.
fn r_squared(y: &DVector<f64>, y_hat: &DVector<f64>) -> Option<f64> {
    let mean = y.mean();
    let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return None;
    }
    let ss_res: f64 = y
        .iter()
        .zip(y_hat.iter())
        .map(|(v, f)| (v - f).powi(2))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EPS_COL, VIX_COL};
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn row(day: u32, change_pct: f64, eps: f64, vix_level: f64) -> FeatureRow {
        FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            change_pct,
            eps,
            vix_level,
        }
    }

    /// Rows lying exactly on `change = 1 + 2*eps - 0.1*vix`.
    fn exact_linear_rows(n: usize) -> Vec<FeatureRow> {
        (0..n)
            .map(|i| {
                let eps = 0.5 + 0.25 * i as f64;
                let vix = 12.0 + 1.5 * ((i * 7) % 11) as f64;
                row((i + 1) as u32, 1.0 + 2.0 * eps - 0.1 * vix, eps, vix)
            })
            .collect()
    }

    #[test]
    fn fit_recovers_an_exact_linear_relationship() {
        let rows = exact_linear_rows(12);
        let mut model = OlsModel::new();
        let metrics = model.fit(&rows, &TrainConfig::default()).unwrap();

        assert!((metrics.train_r2 - 1.0).abs() < 1e-9);
        assert!((metrics.test_r2.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(metrics.n_train + metrics.n_test, 12);

        let fitted = model.fitted().unwrap();
        assert!((fitted.coefficient(INTERCEPT_COL).unwrap() - 1.0).abs() < 1e-8);
        assert!((fitted.coefficient(EPS_COL).unwrap() - 2.0).abs() < 1e-8);
        assert!((fitted.coefficient(VIX_COL).unwrap() + 0.1).abs() < 1e-8);
    }

    #[test]
    fn fit_is_deterministic_for_identical_inputs() {
        let rows = exact_linear_rows(9);
        let cfg = TrainConfig::default();

        let mut a = OlsModel::new();
        let mut b = OlsModel::new();
        let ma = a.fit(&rows, &cfg).unwrap();
        let mb = b.fit(&rows, &cfg).unwrap();

        assert_eq!(ma, mb);
        assert_eq!(a.fitted(), b.fitted());
    }

    #[test]
    fn refit_replaces_previous_state() {
        let mut model = OlsModel::new();
        model.fit(&exact_linear_rows(8), &TrainConfig::default()).unwrap();
        let first = model.predict(&[(EPS_COL, 1.0), (VIX_COL, 20.0)]).unwrap();

        // Shifted relationship: change = 5 + 2*eps - 0.1*vix.
        let shifted: Vec<FeatureRow> = exact_linear_rows(8)
            .into_iter()
            .map(|mut r| {
                r.change_pct += 4.0;
                r
            })
            .collect();
        model.fit(&shifted, &TrainConfig::default()).unwrap();
        let second = model.predict(&[(EPS_COL, 1.0), (VIX_COL, 20.0)]).unwrap();

        assert!((second - first - 4.0).abs() < 1e-7);
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        let mut model = OlsModel::new();
        let err = model
            .fit(&exact_linear_rows(1), &TrainConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        assert!(!model.is_fit());
    }

    #[test]
    fn predict_before_fit_is_a_not_fit_error() {
        let model = OlsModel::new();
        let err = model.predict(&[(EPS_COL, 1.5), (VIX_COL, 20.0)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFit);
    }

    #[test]
    fn predict_defaults_missing_features_to_zero_and_ignores_unknown() {
        let fitted = FittedCoefficients {
            target: "price_change_pct".to_string(),
            columns: vec![
                INTERCEPT_COL.to_string(),
                EPS_COL.to_string(),
                VIX_COL.to_string(),
            ],
            weights: vec![1.0, 2.0, -0.1],
        };
        let model = OlsModel::from_coefficients(fitted);

        // vix_level missing -> contributes 0.0, intercept still 1.0.
        let partial = model.predict(&[(EPS_COL, 2.0)]).unwrap();
        assert!((partial - 5.0).abs() < 1e-12);

        // Unknown extra feature is ignored.
        let extra = model
            .predict(&[(EPS_COL, 2.0), (VIX_COL, 10.0), ("volume", 1e9)])
            .unwrap();
        assert!((extra - 4.0).abs() < 1e-12);
    }

    #[test]
    fn r_squared_is_none_for_zero_variance_target() {
        let y = DVector::from_row_slice(&[3.0, 3.0, 3.0]);
        let y_hat = DVector::from_row_slice(&[3.0, 2.0, 4.0]);
        assert_eq!(r_squared(&y, &y_hat), None);
    }

    #[test]
    fn constant_training_target_is_rejected() {
        let rows: Vec<FeatureRow> = (0..8).map(|i| row(i + 1, 2.5, i as f64, 20.0)).collect();
        let mut model = OlsModel::new();
        let err = model.fit(&rows, &TrainConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn save_load_round_trips_predictions() {
        let rows = exact_linear_rows(10);
        let mut model = OlsModel::new();
        model.fit(&rows, &TrainConfig::default()).unwrap();

        let path = std::env::temp_dir().join(format!("ti-model-{}.json", std::process::id()));
        model.save(&path).unwrap();
        let restored = OlsModel::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        for features in [
            vec![(EPS_COL, 1.5), (VIX_COL, 20.0)],
            vec![(EPS_COL, -0.25), (VIX_COL, 35.0)],
            vec![(EPS_COL, 0.0)],
        ] {
            let a = model.predict(&features).unwrap();
            let b = restored.predict(&features).unwrap();
            assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0), "{a} vs {b}");
        }
    }

    #[test]
    fn save_before_fit_is_a_not_fit_error() {
        let model = OlsModel::new();
        let path = std::env::temp_dir().join("ti-model-unfit.json");
        let err = model.save(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFit);
    }
}
