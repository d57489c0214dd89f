//! Local CSV close-series loading.
//!
//! Accepts the small headered layout the dashboard's sample assets use:
//! a `date` column plus a close column (`close` or `vix_close`), matched
//! case-insensitively. Extra columns are ignored. Malformed rows reject the
//! file with a line-numbered error.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::AppError;

const CLOSE_COLUMNS: &[&str] = &["close", "vix_close"];

/// Load `(date, close)` pairs from a CSV file, in file order.
pub fn load_close_csv(path: &Path) -> Result<Vec<(NaiveDate, f64)>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::malformed_input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let date_idx = find_column(&headers, &["date"]).ok_or_else(|| {
        AppError::malformed_input(format!("CSV '{}' has no 'date' column.", path.display()))
    })?;
    let close_idx = find_column(&headers, CLOSE_COLUMNS).ok_or_else(|| {
        AppError::malformed_input(format!(
            "CSV '{}' has no close column (expected one of: {}).",
            path.display(),
            CLOSE_COLUMNS.join(", ")
        ))
    })?;

    let mut out = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        // Header is line 1; data starts on line 2.
        let line = idx + 2;
        let record = record
            .map_err(|e| AppError::malformed_input(format!("CSV row at line {line}: {e}")))?;

        let date_raw = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d").map_err(|e| {
            AppError::malformed_input(format!("Invalid date '{date_raw}' at line {line}: {e}"))
        })?;

        let close_raw = record.get(close_idx).unwrap_or_default();
        let close: f64 = close_raw.parse().map_err(|e| {
            AppError::malformed_input(format!("Invalid close '{close_raw}' at line {line}: {e}"))
        })?;

        out.push((date, close));
    }

    Ok(out)
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("ti-{}-{name}", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_a_stock_layout() {
        let path = write_temp(
            "stock.csv",
            "Date,Open,Close\n2024-01-02,184.2,185.64\n2024-01-03,183.9,184.25\n",
        );
        let series = load_close_csv(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].0, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!((series[0].1 - 185.64).abs() < 1e-12);
    }

    #[test]
    fn loads_a_vix_layout() {
        let path = write_temp("vix.csv", "Date,VIX_Close\n2024-01-02,13.2\n");
        let series = load_close_csv(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(series.len(), 1);
        assert!((series[0].1 - 13.2).abs() < 1e-12);
    }

    #[test]
    fn missing_close_column_is_malformed() {
        let path = write_temp("noclose.csv", "Date,Volume\n2024-01-02,100\n");
        let err = load_close_csv(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn bad_row_names_its_line() {
        let path = write_temp(
            "badrow.csv",
            "Date,Close\n2024-01-02,185.64\n2024-01-03,n/a\n",
        );
        let err = load_close_csv(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("line 3"), "{err}");
    }
}
