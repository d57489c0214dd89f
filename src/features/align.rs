//! Event alignment: earnings dates to surrounding trading days.

use crate::domain::{AlignedObservation, EarningsEvent, PricePoint};
use crate::error::AppError;

/// Align each earnings event to its nearest surrounding trading days and
/// compute the realized percentage move across the event.
///
/// For an event dated `d`:
/// - `before` = latest price strictly earlier than `d`
/// - `after`  = earliest price strictly later than `d`
///
/// Events missing either neighbor are dropped silently. A zero `before` close
/// is rejected: the division would otherwise propagate ±∞ into the dataset.
///
/// Precondition: `prices` sorted ascending and unique by date (guaranteed by
/// the series loaders).
pub fn align_events(
    prices: &[PricePoint],
    events: &[EarningsEvent],
) -> Result<Vec<AlignedObservation>, AppError> {
    let mut out = Vec::with_capacity(events.len());

    for event in events {
        // First index with date >= event date; everything left of it is strictly earlier.
        let split = prices.partition_point(|p| p.date < event.date);
        let before = split.checked_sub(1).map(|i| &prices[i]);
        // First index with date > event date.
        let after = prices[split..].iter().find(|p| p.date > event.date);

        let (Some(before), Some(after)) = (before, after) else {
            continue;
        };

        if before.close == 0.0 {
            return Err(AppError::malformed_input(format!(
                "Zero close on {} makes the move across the {} earnings event undefined.",
                before.date, event.date,
            )));
        }

        out.push(AlignedObservation {
            date: event.date,
            change_pct: (after.close - before.close) / before.close * 100.0,
            eps: event.eps,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn p(date: NaiveDate, close: f64) -> PricePoint {
        PricePoint { date, close }
    }

    #[test]
    fn computes_change_between_strict_neighbors() {
        let prices = vec![p(d(2024, 1, 1), 100.0), p(d(2024, 1, 5), 110.0)];
        let events = vec![EarningsEvent { date: d(2024, 1, 3), eps: 1.5 }];

        let obs = align_events(&prices, &events).unwrap();
        assert_eq!(obs.len(), 1);
        assert!((obs[0].change_pct - 10.0).abs() < 1e-12);
        assert!((obs[0].eps - 1.5).abs() < 1e-12);
    }

    #[test]
    fn same_day_price_is_not_a_neighbor() {
        // A price exactly on the event date must not serve as before or after.
        let prices = vec![
            p(d(2024, 1, 2), 100.0),
            p(d(2024, 1, 3), 999.0),
            p(d(2024, 1, 4), 105.0),
        ];
        let events = vec![EarningsEvent { date: d(2024, 1, 3), eps: 1.0 }];

        let obs = align_events(&prices, &events).unwrap();
        assert_eq!(obs.len(), 1);
        assert!((obs[0].change_pct - 5.0).abs() < 1e-12);
    }

    #[test]
    fn event_without_earlier_neighbor_is_dropped() {
        let prices = vec![p(d(2024, 1, 5), 110.0), p(d(2024, 1, 8), 112.0)];
        let events = vec![EarningsEvent { date: d(2024, 1, 3), eps: 1.5 }];

        let obs = align_events(&prices, &events).unwrap();
        assert!(obs.is_empty());
    }

    #[test]
    fn event_without_later_neighbor_is_dropped() {
        let prices = vec![p(d(2024, 1, 1), 100.0), p(d(2024, 1, 2), 101.0)];
        let events = vec![EarningsEvent { date: d(2024, 1, 3), eps: 1.5 }];

        let obs = align_events(&prices, &events).unwrap();
        assert!(obs.is_empty());
    }

    #[test]
    fn zero_before_close_is_an_error_not_infinity() {
        let prices = vec![p(d(2024, 1, 1), 0.0), p(d(2024, 1, 5), 110.0)];
        let events = vec![EarningsEvent { date: d(2024, 1, 3), eps: 1.5 }];

        let err = align_events(&prices, &events).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn drops_are_per_event_not_batch() {
        let prices = vec![p(d(2024, 1, 1), 100.0), p(d(2024, 1, 5), 110.0)];
        let events = vec![
            EarningsEvent { date: d(2023, 12, 1), eps: 0.9 }, // no earlier neighbor
            EarningsEvent { date: d(2024, 1, 3), eps: 1.5 },  // fine
            EarningsEvent { date: d(2024, 2, 1), eps: 1.7 },  // no later neighbor
        ];

        let obs = align_events(&prices, &events).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].date, d(2024, 1, 3));
    }
}
