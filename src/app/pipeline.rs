//! Shared analysis pipeline used by both the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load series -> parse earnings -> build dataset -> fit -> predict -> recommend
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::Duration;

use crate::data::{ChartClient, SampleConfig};
use crate::domain::{
    DataSource, DatasetSummary, EPS_COL, EarningsEvent, FeatureRow, FitMetrics,
    NextEarningsSignal, PricePoint, RunConfig, VIX_COL, VolatilityPoint,
};
use crate::error::AppError;
use crate::model::OlsModel;

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub prices: Vec<PricePoint>,
    pub volatility: Vec<VolatilityPoint>,
    pub dataset: Vec<FeatureRow>,
    pub summary: DatasetSummary,
    pub metrics: FitMetrics,
    pub model: OlsModel,
    pub latest: NextEarningsSignal,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_analysis(config: &RunConfig) -> Result<RunOutput, AppError> {
    let (prices, volatility) = load_series(config)?;
    let events = load_events(config)?;
    run_with_inputs(config, prices, volatility, events)
}

/// Load the price and volatility series per the configured source.
///
/// Split out so the TUI can refetch once and refit many times.
pub fn load_series(
    config: &RunConfig,
) -> Result<(Vec<PricePoint>, Vec<VolatilityPoint>), AppError> {
    match &config.source {
        DataSource::Remote => {
            let client = ChartClient::from_env()?;
            let prices = client.fetch_prices(&config.ticker, config.start, config.end)?;
            let volatility =
                client.fetch_volatility(&config.vix_symbol, config.start, config.end)?;
            Ok((prices, volatility))
        }
        DataSource::Sample => {
            let sample = SampleConfig::new(config.start, config.end, config.sample_seed);
            crate::data::generate_sample(&sample)
        }
        DataSource::Csv { stock, vix } => {
            let prices = crate::data::into_price_series(
                crate::data::normalize_closes(crate::io::series::load_close_csv(stock)?),
                &config.ticker,
            )?;
            let volatility = crate::data::into_volatility_series(
                crate::data::normalize_closes(crate::io::series::load_close_csv(vix)?),
                &config.vix_symbol,
            )?;
            Ok((prices, volatility))
        }
    }
}

/// Load earnings events per the config: a file when given, synthetic events
/// for the file-less sample mode.
pub fn load_events(config: &RunConfig) -> Result<Vec<EarningsEvent>, AppError> {
    match (&config.earnings_path, &config.source) {
        (Some(path), _) => crate::io::earnings::read_earnings_file(path),
        (None, DataSource::Sample) => {
            let sample = SampleConfig::new(config.start, config.end, config.sample_seed);
            crate::data::generate_sample_earnings(&sample)
        }
        (None, _) => Err(AppError::config(
            "An earnings file is required unless the sample source is used.",
        )),
    }
}

/// Execute the pipeline with pre-loaded inputs.
pub fn run_with_inputs(
    config: &RunConfig,
    prices: Vec<PricePoint>,
    volatility: Vec<VolatilityPoint>,
    events: Vec<EarningsEvent>,
) -> Result<RunOutput, AppError> {
    let dataset = crate::features::build_dataset(&prices, &events, &volatility)?;
    if dataset.is_empty() {
        return Err(AppError::insufficient_data(
            "No earnings events could be aligned with prices and volatility in range.",
        ));
    }
    let summary = DatasetSummary {
        events_parsed: events.len(),
        rows: dataset.len(),
    };

    let mut model = OlsModel::new();
    let metrics = model.fit(&dataset, &config.train)?;

    let latest = next_earnings_signal(config, &model, &events, &volatility)?;

    Ok(RunOutput {
        prices,
        volatility,
        dataset,
        summary,
        metrics,
        model,
        latest,
    })
}

/// Predict the move after the *next* earnings from the latest known features:
/// the last reported EPS and the volatility level as of the last earnings date.
fn next_earnings_signal(
    config: &RunConfig,
    model: &OlsModel,
    events: &[EarningsEvent],
    volatility: &[VolatilityPoint],
) -> Result<NextEarningsSignal, AppError> {
    // `load_events` returns a sorted, non-empty list.
    let last = events.last().ok_or_else(|| {
        AppError::insufficient_data("No earnings events available for prediction.")
    })?;

    let split = volatility.partition_point(|v| v.date <= last.date);
    let vix_level = split
        .checked_sub(1)
        .map(|i| volatility[i].close)
        .ok_or_else(|| {
            AppError::data_unavailable(format!(
                "No volatility data on or before the last earnings date {}.",
                last.date
            ))
        })?;

    let predicted_pct = model.predict(&[(EPS_COL, last.eps), (VIX_COL, vix_level)])?;
    let recommendation = crate::signal::recommend(predicted_pct, config.neutral_band_pct)?;

    Ok(NextEarningsSignal {
        last_earnings: last.date,
        est_next_earnings: last.date + Duration::days(90),
        eps: last.eps,
        vix_level,
        predicted_pct,
        recommendation,
    })
}
