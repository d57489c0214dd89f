//! Chart-endpoint integration for daily close series.
//!
//! Fetches `{date, close}` candles for a ticker (and the volatility symbol)
//! from a Yahoo-style `v8/finance/chart` endpoint. The core only consumes
//! closes, so everything else in the candle payload is ignored.

use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{PricePoint, VolatilityPoint};
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

pub struct ChartClient {
    client: Client,
    base_url: String,
}

impl ChartClient {
    /// Build a client, honoring a `TI_DATA_BASE_URL` override (environment or
    /// `.env`) so tests and self-hosted mirrors can redirect the fetch.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var("TI_DATA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let client = Client::builder()
            // The endpoint rejects requests without a UA.
            .user_agent(concat!("ti/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, AppError> {
        let raw = self.fetch_daily_closes(ticker, start, end)?;
        super::into_price_series(super::normalize_closes(raw), ticker)
    }

    pub fn fetch_volatility(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VolatilityPoint>, AppError> {
        let raw = self.fetch_daily_closes(symbol, start, end)?;
        super::into_volatility_series(super::normalize_closes(raw), symbol)
    }

    fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, AppError> {
        if start >= end {
            return Err(AppError::config(format!(
                "Start date {start} must be before end date {end}."
            )));
        }

        // period2 is exclusive at day granularity, so push it one day past `end`.
        let period1 = unix_midnight(start);
        let period2 = unix_midnight(end.succ_opt().ok_or_else(|| {
            AppError::config(format!("End date {end} is out of calendar range."))
        })?);

        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .map_err(|e| AppError::data_unavailable(format!("Chart request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::data_unavailable(format!(
                "Chart request for {symbol} failed with status {}.",
                resp.status()
            )));
        }

        let body: ChartResponse = resp.json().map_err(|e| {
            AppError::data_unavailable(format!("Failed to parse chart response: {e}"))
        })?;

        let result = body
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| {
                AppError::data_unavailable(format!("No chart data returned for {symbol}."))
            })?;

        Ok(closes_from_result(result))
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Pair timestamps with closes, skipping null candles (holidays, halts).
fn closes_from_result(result: ChartResult) -> Vec<(NaiveDate, f64)> {
    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    timestamps
        .into_iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close?;
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some((date, close))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_skip_null_candles() {
        let payload = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": { "quote": [{ "close": [185.64, null, 184.25] }] }
                }]
            }
        }"#;

        let body: ChartResponse = serde_json::from_str(payload).unwrap();
        let result = body.chart.result.unwrap().remove(0);
        let closes = closes_from_result(result);

        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].0, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!((closes[0].1 - 185.64).abs() < 1e-12);
        assert_eq!(closes[1].0, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn empty_result_yields_no_closes() {
        let payload = r#"{"chart": {"result": [{"indicators": {"quote": []}}]}}"#;
        let body: ChartResponse = serde_json::from_str(payload).unwrap();
        let result = body.chart.result.unwrap().remove(0);
        assert!(closes_from_result(result).is_empty());
    }

    #[test]
    fn unix_midnight_is_utc_day_start() {
        let ts = unix_midnight(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(ts, 1704153600);
    }
}
