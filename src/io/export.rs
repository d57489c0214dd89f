//! Export the backtest dataset to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::FeatureRow;
use crate::error::AppError;

/// Write one dataset row per line, ascending by earnings date.
pub fn write_dataset_csv(path: &Path, rows: &[FeatureRow]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "earnings_date,price_change_pct,eps,vix_level")
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for row in rows {
        writeln!(
            file,
            "{},{:.6},{:.4},{:.4}",
            row.date, row.change_pct, row.eps, row.vix_level
        )
        .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
