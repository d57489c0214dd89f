//! Market-data acquisition and normalization.
//!
//! Every loader (remote, synthetic, local CSV) funnels through
//! [`normalize_closes`] before the series reaches the core, which is what
//! guarantees the aligner's precondition: sorted ascending, unique by date,
//! finite closes only.

pub mod sample;
pub mod yahoo;

pub use sample::{SampleConfig, generate_sample, generate_sample_earnings};
pub use yahoo::ChartClient;

use chrono::NaiveDate;

use crate::domain::{PricePoint, VolatilityPoint};
use crate::error::AppError;

/// Normalize a raw close series: drop non-finite values, sort ascending,
/// collapse duplicate dates keeping the last observation.
pub fn normalize_closes(mut raw: Vec<(NaiveDate, f64)>) -> Vec<(NaiveDate, f64)> {
    raw.retain(|(_, close)| close.is_finite());
    raw.sort_by_key(|(date, _)| *date);

    let mut out: Vec<(NaiveDate, f64)> = Vec::with_capacity(raw.len());
    for (date, close) in raw {
        match out.last_mut() {
            Some(last) if last.0 == date => last.1 = close,
            _ => out.push((date, close)),
        }
    }
    out
}

/// Convert a normalized close series into price points.
///
/// An empty series is fatal: the run cannot proceed without prices in range.
pub fn into_price_series(
    raw: Vec<(NaiveDate, f64)>,
    symbol: &str,
) -> Result<Vec<PricePoint>, AppError> {
    if raw.is_empty() {
        return Err(AppError::data_unavailable(format!(
            "No stock data for {symbol}."
        )));
    }
    Ok(raw
        .into_iter()
        .map(|(date, close)| PricePoint { date, close })
        .collect())
}

/// Convert a normalized close series into volatility points.
pub fn into_volatility_series(
    raw: Vec<(NaiveDate, f64)>,
    symbol: &str,
) -> Result<Vec<VolatilityPoint>, AppError> {
    if raw.is_empty() {
        return Err(AppError::data_unavailable(format!(
            "No volatility data for {symbol}."
        )));
    }
    Ok(raw
        .into_iter()
        .map(|(date, close)| VolatilityPoint { date, close })
        .collect())
}
