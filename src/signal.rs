//! Recommendation rule: threshold a predicted move against a neutral band.

use crate::domain::Recommendation;
use crate::error::AppError;

/// Classify a predicted percentage move against a symmetric neutral band.
///
/// `predicted_pct > band` → Buy, `predicted_pct < -band` → Avoid, otherwise
/// Hold — the band boundaries themselves are Hold. The band must be a
/// non-negative finite number; it is caller-supplied configuration, not state.
pub fn recommend(predicted_pct: f64, neutral_band_pct: f64) -> Result<Recommendation, AppError> {
    if !(neutral_band_pct.is_finite() && neutral_band_pct >= 0.0) {
        return Err(AppError::config(format!(
            "Neutral band must be a non-negative percentage, got {neutral_band_pct}."
        )));
    }

    if predicted_pct > neutral_band_pct {
        Ok(Recommendation::Buy)
    } else if predicted_pct < -neutral_band_pct {
        Ok(Recommendation::Avoid)
    } else {
        Ok(Recommendation::Hold)
    }
}
