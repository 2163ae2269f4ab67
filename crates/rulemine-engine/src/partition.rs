//! Seeded sampling and train/validation splitting.
//!
//! Every draw builds its own `StdRng` from a fixed seed, so identical inputs
//! and seeds always give identical partitions.

use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rulemine_core::error::{Result, RuleMineError};
use rulemine_core::table::FeatureTable;
use rulemine_core::types::FeatureId;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Seeds and fraction for sampling and splitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub sample_seed: u64,
    pub split_seed: u64,
    /// Share of rows held out for validation, in `(0, 1)`.
    pub test_fraction: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            sample_seed: 41,
            split_seed: 42,
            test_fraction: 0.3,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(RuleMineError::out_of_range(
                "test_fraction",
                "(0, 1)",
                self.test_fraction,
            ));
        }
        Ok(())
    }
}

/// Disjoint training and validation tables.
#[derive(Debug, Clone)]
pub struct Partition {
    pub training: FeatureTable,
    pub validation: FeatureTable,
}

/// Draw `n` rows without replacement, in draw order.
pub fn sample_rows(table: &FeatureTable, n: usize, seed: u64) -> Result<FeatureTable> {
    if n > table.num_rows() {
        return Err(RuleMineError::sampling(format!(
            "cannot sample {} rows from a table of {}",
            n,
            table.num_rows()
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = index::sample(&mut rng, table.num_rows(), n).into_vec();
    Ok(table.select_rows(&rows))
}

/// Draw `n` feature columns without replacement, in draw order.
pub fn sample_features(table: &FeatureTable, n: usize, seed: u64) -> Result<FeatureTable> {
    if n > table.num_features() {
        return Err(RuleMineError::sampling(format!(
            "cannot sample {} features from a table of {}",
            n,
            table.num_features()
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let ids: Vec<FeatureId> = index::sample(&mut rng, table.num_features(), n)
        .into_iter()
        .map(FeatureId::from)
        .collect();
    table.select_features(&ids)
}

/// Shuffle rows and hold out `ceil(n * test_fraction)` of them.
pub fn train_validation_split(
    table: &FeatureTable,
    test_fraction: f64,
    seed: u64,
) -> Result<Partition> {
    let n = table.num_rows();
    let held_out = (n as f64 * test_fraction).ceil() as usize;
    if held_out == 0 || held_out >= n {
        return Err(RuleMineError::sampling(format!(
            "splitting {} rows at test fraction {} leaves one side empty",
            n, test_fraction
        )));
    }

    let mut rows: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);
    let (validation, training) = rows.split_at(held_out);
    Ok(Partition {
        training: table.select_rows(training),
        validation: table.select_rows(validation),
    })
}

/// Optional row and column sampling followed by the split.
pub fn prepare(
    table: &FeatureTable,
    sample_size: Option<usize>,
    feature_count: Option<usize>,
    config: &SplitConfig,
) -> Result<Partition> {
    config.validate()?;
    let sampled = match sample_size {
        Some(n) => sample_rows(table, n, config.sample_seed)?,
        None => table.clone(),
    };
    let sampled = match feature_count {
        Some(n) => sample_features(&sampled, n, config.sample_seed)?,
        None => sampled,
    };
    let partition = train_validation_split(&sampled, config.test_fraction, config.split_seed)?;
    info!(
        training = partition.training.num_rows(),
        validation = partition.validation.num_rows(),
        features = sampled.num_features(),
        "table partitioned"
    );
    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::schema::Schema;
    use rulemine_core::types::NamespacePrefixes;

    fn table(rows: usize) -> FeatureTable {
        let schema = Schema::from_columns(
            &["inf_a", "inf_b", "usr_c", "usr_d"],
            &NamespacePrefixes::default(),
        )
        .unwrap();
        let data: Vec<Vec<bool>> = (0..rows)
            .map(|r| vec![r % 2 == 0, r % 3 == 0, r % 5 == 0, r % 7 == 0])
            .collect();
        FeatureTable::from_rows(schema, &data).unwrap()
    }

    #[test]
    fn split_sizes_round_validation_up() {
        let p = train_validation_split(&table(10), 0.3, 42).unwrap();
        assert_eq!(p.validation.num_rows(), 3);
        assert_eq!(p.training.num_rows(), 7);

        let p = train_validation_split(&table(11), 0.3, 42).unwrap();
        assert_eq!(p.validation.num_rows(), 4);
        assert_eq!(p.training.num_rows(), 7);
    }

    #[test]
    fn same_seed_same_partition() {
        let t = table(50);
        let a = prepare(&t, Some(40), Some(3), &SplitConfig::default()).unwrap();
        let b = prepare(&t, Some(40), Some(3), &SplitConfig::default()).unwrap();
        assert_eq!(a.training, b.training);
        assert_eq!(a.validation, b.validation);
        assert_eq!(a.training.num_features(), 3);
    }

    #[test]
    fn oversampling_is_an_error() {
        let t = table(5);
        assert!(matches!(
            sample_rows(&t, 6, 41).unwrap_err(),
            RuleMineError::Sampling(_)
        ));
        assert!(matches!(
            sample_features(&t, 5, 41).unwrap_err(),
            RuleMineError::Sampling(_)
        ));
    }

    #[test]
    fn degenerate_splits_are_rejected() {
        assert!(train_validation_split(&table(1), 0.3, 42).is_err());
        assert!(train_validation_split(&table(0), 0.3, 42).is_err());
        let bad = SplitConfig {
            test_fraction: 1.0,
            ..SplitConfig::default()
        };
        assert!(bad.validate().unwrap_err().is_config());
    }
}
