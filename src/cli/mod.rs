//! Command-line parsing for the earnings event study.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the feature/model code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ti", version, about = "Earnings Event Study (EPS + VIX → OLS)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the dataset, fit the model, print diagnostics and the
    /// recommendation, and optionally plot/export.
    Run(RunArgs),
    /// Predict a move from a saved model artifact and explicit features.
    Predict(PredictArgs),
    /// Launch the interactive TUI dashboard.
    ///
    /// This uses the same underlying analysis pipeline as `ti run`, but
    /// renders results in a terminal UI using Ratatui.
    Tui(RunArgs),
}

/// Common options for running the analysis.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Ticker symbol to study.
    #[arg(short = 't', long, default_value = "AAPL")]
    pub ticker: String,

    /// Volatility index symbol.
    #[arg(long, default_value = "^VIX")]
    pub vix: String,

    /// Start of the analysis range (YYYY-MM-DD).
    #[arg(long, default_value = "2018-01-01")]
    pub start: NaiveDate,

    /// End of the analysis range (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Earnings list: one `YYYY-MM-DD, EPS` record per line.
    ///
    /// Optional with `--sample`, which generates synthetic events instead.
    #[arg(long = "earnings-file", value_name = "TXT")]
    pub earnings_file: Option<PathBuf>,

    /// Use a deterministic synthetic sample instead of fetching remote data.
    #[arg(long)]
    pub sample: bool,

    /// Seed for the synthetic sample generator.
    #[arg(long, default_value_t = 42)]
    pub sample_seed: u64,

    /// Load the stock series from a local CSV instead of fetching.
    #[arg(long = "stock-csv", value_name = "CSV", requires = "vix_csv", conflicts_with = "sample")]
    pub stock_csv: Option<PathBuf>,

    /// Load the volatility series from a local CSV instead of fetching.
    #[arg(long = "vix-csv", value_name = "CSV", requires = "stock_csv", conflicts_with = "sample")]
    pub vix_csv: Option<PathBuf>,

    /// Neutral band (±%) within which the prediction is a HOLD.
    #[arg(long, default_value_t = 0.5)]
    pub band: f64,

    /// Held-out fraction for the train/test split.
    #[arg(long, default_value_t = 0.25)]
    pub test_fraction: f64,

    /// Random seed for the train/test split.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write the fitted model artifact to this JSON path.
    #[arg(long = "model-out", value_name = "JSON")]
    pub model_out: Option<PathBuf>,

    /// Append a metrics record to this JSONL log.
    #[arg(long = "metrics-log", value_name = "JSONL")]
    pub metrics_log: Option<PathBuf>,

    /// Export the dataset to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Render an ASCII plot of per-event moves (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for predicting from a saved model artifact.
#[derive(Debug, Parser)]
pub struct PredictArgs {
    /// Model artifact produced by `ti run --model-out`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// EPS expected at the next earnings.
    #[arg(long)]
    pub eps: f64,

    /// Current volatility-index level.
    #[arg(long)]
    pub vix: f64,

    /// Neutral band (±%) within which the prediction is a HOLD.
    #[arg(long, default_value_t = 0.5)]
    pub band: f64,
}
