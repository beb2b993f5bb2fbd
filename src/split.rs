use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::dataset::Dataset;
use crate::error::PipelineError;

pub const DEFAULT_TEST_FRACTION: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct Split {
    pub train_features: Array2<f64>,
    pub test_features: Array2<f64>,
    pub train_labels: Array1<u8>,
    pub test_labels: Array1<u8>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Rows held out for testing: `ceil(fraction * rows)`.
pub fn test_size(rows: usize, test_fraction: f64) -> Result<usize, PipelineError> {
    let invalid = PipelineError::InvalidSplit {
        fraction: test_fraction,
        rows,
    };
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(invalid);
    }

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let held_out = (rows as f64 * test_fraction).ceil() as usize;

    if held_out == 0 || held_out >= rows {
        return Err(invalid);
    }
    Ok(held_out)
}

/// Partition rows by a random permutation: the first `test_size` shuffled indices
/// form the test set, the rest the training set.
pub fn train_test_split<R: Rng + ?Sized>(
    dataset: &Dataset,
    test_fraction: f64,
    rng: &mut R,
) -> Result<Split, PipelineError> {
    let rows = dataset.len();
    let held_out = test_size(rows, test_fraction)?;

    let mut permutation: Vec<usize> = (0..rows).collect();
    permutation.shuffle(rng);
    let (test_indices, train_indices) = permutation.split_at(held_out);

    let features = dataset.feature_matrix();
    let labels = dataset.labels();

    Ok(Split {
        train_features: features.select(Axis(0), train_indices),
        test_features: features.select(Axis(0), test_indices),
        train_labels: labels.select(Axis(0), train_indices),
        test_labels: labels.select(Axis(0), test_indices),
        train_indices: train_indices.to_vec(),
        test_indices: test_indices.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn ramp(rows: usize) -> Dataset {
        let labels: Vec<u8> = (0..rows).map(|i| u8::from(i % 2 == 0)).collect();
        let values: Vec<f64> = (0..rows).map(|i| i as f64).collect();
        Dataset::assemble(&labels, &values, &values).unwrap()
    }

    #[test]
    fn split_is_a_strict_partition() {
        let dataset = ramp(1000);
        let mut rng = StdRng::seed_from_u64(9);
        let split = train_test_split(&dataset, DEFAULT_TEST_FRACTION, &mut rng).unwrap();

        assert_eq!(split.train_indices.len(), 750);
        assert_eq!(split.test_indices.len(), 250);

        let train: HashSet<usize> = split.train_indices.iter().copied().collect();
        let test: HashSet<usize> = split.test_indices.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.union(&test).count(), 1000);
    }

    #[test]
    fn materialized_rows_follow_indices() {
        let dataset = ramp(40);
        let mut rng = StdRng::seed_from_u64(1);
        let split = train_test_split(&dataset, 0.25, &mut rng).unwrap();

        assert_eq!(split.train_features.dim(), (30, 2));
        assert_eq!(split.test_features.dim(), (10, 2));
        for (row, &index) in split.test_indices.iter().enumerate() {
            assert!((split.test_features[(row, 0)] - index as f64).abs() < f64::EPSILON);
            assert_eq!(split.test_labels[row], dataset.records()[index].is_spam);
        }
        for (row, &index) in split.train_indices.iter().enumerate() {
            assert!((split.train_features[(row, 1)] - index as f64).abs() < f64::EPSILON);
            assert_eq!(split.train_labels[row], dataset.records()[index].is_spam);
        }
    }

    #[test]
    fn test_size_rounds_up() {
        assert_eq!(test_size(1000, 0.25).unwrap(), 250);
        assert_eq!(test_size(10, 0.25).unwrap(), 3);
        assert_eq!(test_size(3, 0.1).unwrap(), 1);
    }

    #[test]
    fn degenerate_fractions_are_rejected() {
        for fraction in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                test_size(100, fraction),
                Err(PipelineError::InvalidSplit { .. })
            ));
        }
        // one row cannot feed both sides
        assert!(test_size(1, 0.5).is_err());
    }

    #[test]
    fn same_seed_same_partition() {
        let dataset = ramp(100);
        let first = train_test_split(&dataset, 0.25, &mut StdRng::seed_from_u64(4)).unwrap();
        let second = train_test_split(&dataset, 0.25, &mut StdRng::seed_from_u64(4)).unwrap();

        assert_eq!(first.test_indices, second.test_indices);
    }
}
