//! Feature construction: from raw series + earnings events to the dataset.
//!
//! The pipeline is two joins and a sort:
//!
//! align (surrounding trading days) -> attach (as-of volatility) -> sort
//!
//! Events that cannot be aligned or contextualized are dropped, not errors:
//! a missing neighbor is a data-availability gap, not a fault.

mod align;
mod attach;

pub use align::align_events;
pub use attach::attach_volatility;

use crate::domain::{EarningsEvent, FeatureRow, PricePoint, VolatilityPoint};
use crate::error::AppError;

/// Build the training dataset: align, attach, sort ascending by earnings date.
///
/// No filtering happens here beyond what the two joins already perform.
pub fn build_dataset(
    prices: &[PricePoint],
    events: &[EarningsEvent],
    volatility: &[VolatilityPoint],
) -> Result<Vec<FeatureRow>, AppError> {
    let observations = align_events(prices, events)?;
    let mut rows = attach_volatility(&observations, volatility);
    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn end_to_end_single_event() {
        // prices straddle the event, volatility exists the day before.
        let prices = vec![
            PricePoint { date: d(2024, 1, 1), close: 100.0 },
            PricePoint { date: d(2024, 1, 5), close: 110.0 },
        ];
        let events = vec![EarningsEvent { date: d(2024, 1, 3), eps: 1.50 }];
        let vix = vec![VolatilityPoint { date: d(2024, 1, 2), close: 20.0 }];

        let rows = build_dataset(&prices, &events, &vix).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, d(2024, 1, 3));
        assert!((rows[0].change_pct - 10.0).abs() < 1e-12);
        assert!((rows[0].eps - 1.50).abs() < 1e-12);
        assert!((rows[0].vix_level - 20.0).abs() < 1e-12);
    }

    #[test]
    fn dataset_is_sorted_by_earnings_date() {
        let prices = vec![
            PricePoint { date: d(2024, 1, 1), close: 100.0 },
            PricePoint { date: d(2024, 1, 10), close: 105.0 },
            PricePoint { date: d(2024, 2, 1), close: 104.0 },
            PricePoint { date: d(2024, 2, 10), close: 110.0 },
        ];
        // Events intentionally out of order.
        let events = vec![
            EarningsEvent { date: d(2024, 2, 5), eps: 2.0 },
            EarningsEvent { date: d(2024, 1, 5), eps: 1.0 },
        ];
        let vix = vec![VolatilityPoint { date: d(2024, 1, 1), close: 18.0 }];

        let rows = build_dataset(&prices, &events, &vix).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].date < rows[1].date);
    }
}
