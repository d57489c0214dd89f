//! Volatility context: as-of join onto aligned observations.

use crate::domain::{AlignedObservation, FeatureRow, VolatilityPoint};

/// Attach the most recent volatility level at or before each observation date.
///
/// This is an as-of join with a right-inclusive boundary: same-day volatility
/// is usable, future volatility never is (no lookahead). Observations with no
/// volatility context are dropped.
///
/// Precondition: `volatility` sorted ascending and unique by date.
pub fn attach_volatility(
    observations: &[AlignedObservation],
    volatility: &[VolatilityPoint],
) -> Vec<FeatureRow> {
    observations
        .iter()
        .filter_map(|obs| {
            // Last index with date <= observation date.
            let split = volatility.partition_point(|v| v.date <= obs.date);
            let context = split.checked_sub(1).map(|i| &volatility[i])?;
            Some(FeatureRow {
                date: obs.date,
                change_pct: obs.change_pct,
                eps: obs.eps,
                vix_level: context.close,
            })
        })
        .collect()
}
