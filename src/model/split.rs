//! Deterministic train/test index split.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::AppError;

/// Index partition of `0..n` into train and test sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split `0..n` into train/test partitions.
///
/// The test partition takes `ceil(n * test_fraction)` rows of a seeded
/// shuffle, so the same `(n, test_fraction, seed)` always produces the same
/// partition. Both sides must end up non-empty.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<SplitIndices, AppError> {
    if !(test_fraction.is_finite() && test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AppError::config(format!(
            "Test fraction must be in (0, 1), got {test_fraction}."
        )));
    }

    let n_test = (n as f64 * test_fraction).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_train == 0 || n_test == 0 {
        return Err(AppError::insufficient_data(format!(
            "{n} rows cannot be split into non-empty train/test partitions at fraction {test_fraction}."
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut test: Vec<usize> = indices[..n_test].to_vec();
    let mut train: Vec<usize> = indices[n_test..].to_vec();
    // Partitions keep ascending row order so downstream matrices are stable.
    test.sort_unstable();
    train.sort_unstable();

    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let a = train_test_split(20, 0.25, 42).unwrap();
        let b = train_test_split(20, 0.25, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_shuffle_differently() {
        let a = train_test_split(40, 0.5, 42).unwrap();
        let b = train_test_split(40, 0.5, 43).unwrap();
        assert_ne!(a.test, b.test);
    }

    #[test]
    fn partition_sizes_and_disjointness() {
        let s = train_test_split(10, 0.25, 7).unwrap();
        assert_eq!(s.test.len(), 3); // ceil(10 * 0.25)
        assert_eq!(s.train.len(), 7);

        let mut all: Vec<usize> = s.train.iter().chain(s.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn two_rows_split_one_and_one() {
        let s = train_test_split(2, 0.25, 1).unwrap();
        assert_eq!(s.train.len(), 1);
        assert_eq!(s.test.len(), 1);
    }

    #[test]
    fn one_row_is_insufficient() {
        let err = train_test_split(1, 0.25, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn empty_dataset_is_insufficient() {
        let err = train_test_split(0, 0.25, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn out_of_range_fraction_is_a_config_error() {
        for bad in [0.0, 1.0, -0.5, f64::NAN] {
            let err = train_test_split(10, bad, 1).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
    }
}
