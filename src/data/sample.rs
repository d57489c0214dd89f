//! Synthetic price/volatility sample generation.
//!
//! The dashboard's offline mode has to work without network access, so this
//! module generates a deterministic stand-in for the two remote series:
//!
//! - prices: geometric random walk with a mild upward drift
//! - volatility index: mean-reverting around a long-run level, floored
//!
//! Weekends are skipped so the series has trading-day shape (earnings dates
//! landing on a weekend still align, which mirrors real calendars).

use chrono::{Datelike, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{EarningsEvent, PricePoint, VolatilityPoint};
use crate::error::AppError;

const DAILY_DRIFT: f64 = 0.0003;
const DAILY_VOL: f64 = 0.018;
const VIX_LONG_RUN: f64 = 19.5;
const VIX_REVERSION: f64 = 0.08;
const VIX_NOISE: f64 = 1.1;
const VIX_FLOOR: f64 = 9.0;
const VIX_CAP: f64 = 80.0;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub seed: u64,
    pub start_price: f64,
    pub start_vix: f64,
}

impl SampleConfig {
    pub fn new(start: NaiveDate, end: NaiveDate, seed: u64) -> Self {
        Self {
            start,
            end,
            seed,
            start_price: 180.0,
            start_vix: 18.0,
        }
    }
}

/// Generate both series for the configured range. Identical config produces
/// identical series.
pub fn generate_sample(
    config: &SampleConfig,
) -> Result<(Vec<PricePoint>, Vec<VolatilityPoint>), AppError> {
    if config.start >= config.end {
        return Err(AppError::config(format!(
            "Sample start {} must be before end {}.",
            config.start, config.end
        )));
    }
    if !(config.start_price.is_finite() && config.start_price > 0.0) {
        return Err(AppError::config("Sample start price must be positive."));
    }
    if !(config.start_vix.is_finite() && config.start_vix > 0.0) {
        return Err(AppError::config("Sample start volatility must be positive."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::config(format!("Noise distribution error: {e}")))?;

    let mut prices = Vec::new();
    let mut volatility = Vec::new();
    let mut price = config.start_price;
    let mut vix = config.start_vix;

    let mut date = config.start;
    while date <= config.end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let z: f64 = normal.sample(&mut rng);
            price *= (DAILY_DRIFT + DAILY_VOL * z).exp();

            let z_vix: f64 = normal.sample(&mut rng);
            vix = (vix + VIX_REVERSION * (VIX_LONG_RUN - vix) + VIX_NOISE * z_vix)
                .clamp(VIX_FLOOR, VIX_CAP);

            prices.push(PricePoint { date, close: price });
            volatility.push(VolatilityPoint { date, close: vix });
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    if prices.is_empty() {
        return Err(AppError::data_unavailable(
            "Sample range contains no trading days.",
        ));
    }

    Ok((prices, volatility))
}

/// Generate a quarterly synthetic earnings history for the sample range.
///
/// Events start 45 days into the range and repeat every 91 days, stopping a
/// week short of the end so each event still has a later trading day to align
/// against. EPS follows a slow upward drift with seeded noise.
pub fn generate_sample_earnings(config: &SampleConfig) -> Result<Vec<EarningsEvent>, AppError> {
    if config.start >= config.end {
        return Err(AppError::config(format!(
            "Sample start {} must be before end {}.",
            config.start, config.end
        )));
    }

    // Offset the stream so earnings noise is independent of the series noise.
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(0x9e37_79b9));
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::config(format!("Noise distribution error: {e}")))?;

    let last_allowed = config.end - chrono::Duration::days(7);
    let mut events = Vec::new();
    let mut date = config.start + chrono::Duration::days(45);
    let mut quarter = 0u32;

    while date <= last_allowed {
        let z: f64 = normal.sample(&mut rng);
        let eps = 1.2 + 0.05 * quarter as f64 + 0.3 * z;
        events.push(EarningsEvent { date, eps });
        date = date + chrono::Duration::days(91);
        quarter += 1;
    }

    if events.is_empty() {
        return Err(AppError::data_unavailable(
            "Sample range is too short to contain an earnings event.",
        ));
    }

    Ok(events)
}
