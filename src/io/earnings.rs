//! Earnings-list parsing.
//!
//! Format: one record per line, `YYYY-MM-DD, <floating-point EPS>`. Blank
//! lines are ignored. Any line that does not match rejects the whole batch —
//! a silently half-parsed earnings history would poison every downstream
//! number, so this boundary is fail-fast, not skip-and-continue.

use std::path::Path;

use chrono::NaiveDate;

use crate::domain::EarningsEvent;
use crate::error::AppError;

/// Parse earnings text into events sorted ascending by date.
pub fn parse_earnings_text(text: &str) -> Result<Vec<EarningsEvent>, AppError> {
    let mut events = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let Some((date_part, eps_part)) = line.split_once(',') else {
            return Err(bad_line(idx, line, "expected 'YYYY-MM-DD, EPS'"));
        };

        let date = NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d")
            .map_err(|e| bad_line(idx, line, &format!("invalid date: {e}")))?;

        let eps: f64 = eps_part
            .trim()
            .parse()
            .map_err(|e| bad_line(idx, line, &format!("invalid EPS: {e}")))?;
        if !eps.is_finite() {
            return Err(bad_line(idx, line, "EPS must be finite"));
        }

        events.push(EarningsEvent { date, eps });
    }

    if events.is_empty() {
        return Err(AppError::malformed_input("No earnings records parsed."));
    }

    events.sort_by_key(|e| e.date);
    Ok(events)
}

/// Read and parse an earnings file.
pub fn read_earnings_file(path: &Path) -> Result<Vec<EarningsEvent>, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::config(format!(
            "Failed to read earnings file '{}': {e}",
            path.display()
        ))
    })?;
    parse_earnings_text(&text)
}

fn bad_line(idx: usize, line: &str, detail: &str) -> AppError {
    AppError::malformed_input(format!(
        "Bad earnings line {}: '{line}' ({detail}).",
        idx + 1
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_and_sorts_valid_lines() {
        let text = "2024-04-25, 1.52\n\n2024-01-30, 2.18\n2024-07-31,1.40\n";
        let events = parse_earnings_text(text).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 30).unwrap()
        );
        assert!((events[0].eps - 2.18).abs() < 1e-12);
        assert!(events.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn missing_comma_rejects_the_whole_batch() {
        let text = "2024-01-30, 2.18\n2024-01-03 1.50\n";
        let err = parse_earnings_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("2024-01-03 1.50"));
    }

    #[test]
    fn invalid_date_is_malformed() {
        let err = parse_earnings_text("2024-13-01, 1.0\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn non_numeric_eps_is_malformed() {
        let err = parse_earnings_text("2024-01-30, beat\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn non_finite_eps_is_malformed() {
        // "inf" parses as a valid f64, but EPS must be a finite real number.
        let err = parse_earnings_text("2024-01-30, inf\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn trailing_field_is_malformed() {
        let err = parse_earnings_text("2024-01-30, 2.18, surprise\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = parse_earnings_text("\n  \n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }
}
