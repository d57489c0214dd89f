//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads series and earnings
//! - runs the analysis pipeline
//! - prints reports/plots
//! - writes optional artifacts (model JSON, metrics log, dataset CSV)

use clap::Parser;

use crate::cli::{Command, PredictArgs, RunArgs};
use crate::domain::{DataSource, EPS_COL, RunConfig, TrainConfig, VIX_COL};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ti` binary.
pub fn run() -> Result<(), AppError> {
    // We want `ti` and `ti -t MSFT` to behave like `ti tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Predict(args) => handle_predict(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&config, &run.summary, &run.metrics, &run.latest)
    );
    for alert in crate::report::basic_alerts(&run.metrics) {
        println!("{alert}");
    }

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run.dataset, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional artifacts.
    if let Some(path) = &config.model_out {
        run.model.save(path)?;
    }
    if let Some(path) = &config.metrics_log {
        crate::report::append_metrics_jsonl(path, &run.metrics, unix_now()?)?;
    }
    if let Some(path) = &config.export {
        crate::io::export::write_dataset_csv(path, &run.dataset)?;
    }

    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let model = crate::model::OlsModel::load(&args.model)?;
    let predicted = model.predict(&[(EPS_COL, args.eps), (VIX_COL, args.vix)])?;
    let recommendation = crate::signal::recommend(predicted, args.band)?;

    println!(
        "predicted move = {predicted:+.2}% | recommendation = {} (band ±{:.2}%)",
        recommendation.display_name(),
        args.band
    );
    Ok(())
}

fn handle_tui(args: RunArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

/// Resolve CLI flags into a pipeline config.
///
/// The end date defaults to today *here*, at the application boundary; the
/// core only ever sees the resolved date.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let source = match (&args.stock_csv, &args.vix_csv, args.sample) {
        (Some(stock), Some(vix), _) => DataSource::Csv {
            stock: stock.clone(),
            vix: vix.clone(),
        },
        (None, None, true) => DataSource::Sample,
        (None, None, false) => DataSource::Remote,
        // clap's `requires` already rejects a lone CSV flag.
        _ => return Err(AppError::config("Both --stock-csv and --vix-csv are required.")),
    };

    if args.earnings_file.is_none() && source != DataSource::Sample {
        return Err(AppError::config(
            "--earnings-file is required unless --sample is set.",
        ));
    }

    let end = args
        .end
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    Ok(RunConfig {
        ticker: args.ticker.clone(),
        vix_symbol: args.vix.clone(),
        start: args.start,
        end,
        earnings_path: args.earnings_file.clone(),
        source,
        sample_seed: args.sample_seed,
        neutral_band_pct: args.band,
        train: TrainConfig {
            test_fraction: args.test_fraction,
            seed: args.seed,
            ..TrainConfig::default()
        },
        model_out: args.model_out.clone(),
        metrics_log: args.metrics_log.clone(),
        export: args.export.clone(),
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
    })
}

fn unix_now() -> Result<i64, AppError> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| AppError::config(format!("System clock is before the Unix epoch: {e}")))?;
    Ok(now.as_secs() as i64)
}

/// Rewrite argv so `ti` defaults to `ti tui`.
///
/// Rules:
/// - `ti`                      -> `ti tui`
/// - `ti -t MSFT ...`          -> `ti tui -t MSFT ...`
/// - `ti --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "predict" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
