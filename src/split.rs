//! Deterministic train/validation/test partitioning.
//!
//! Normal inputs are partitioned twice with a seeded shuffle: first into
//! train versus a combined validation+test pool, then the pool into
//! validation and test with the same seed. Identical `(input order,
//! ratios, seed)` always produces the identical partition.
//!
//! Tiny inputs (fewer than [`TINY_DATASET_LIMIT`] records) keep the
//! pipeline runnable instead of correct-at-scale: everything goes to
//! train and validation/test each reuse one record from it. That reuse is
//! intentional and is flagged to the user; treat metrics from such splits
//! as having reduced statistical validity.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Below this record count the duplication fallback applies.
pub const TINY_DATASET_LIMIT: usize = 10;

/// Allowed deviation of the ratio sum from 1.0.
pub const RATIO_TOLERANCE: f64 = 1e-6;

/// The three named dataset partitions.
#[derive(Debug, Clone)]
pub struct Splits<T> {
    pub train: Vec<T>,
    pub validation: Vec<T>,
    pub test: Vec<T>,
}

impl<T> Splits<T> {
    /// Iterate `(name, records)` in persistence order.
    pub fn named(&self) -> [(&'static str, &Vec<T>); 3] {
        [
            ("train", &self.train),
            ("validation", &self.validation),
            ("test", &self.test),
        ]
    }
}

/// Partition `records` under the given ratio policy.
///
/// Fails when the ratios do not sum to 1 within [`RATIO_TOLERANCE`].
/// Split sizes are `max(1, floor(n * ratio))` for test and validation,
/// with train taking the remainder.
pub fn split_dataset<T: Clone>(
    records: Vec<T>,
    train_ratio: f64,
    val_ratio: f64,
    test_ratio: f64,
    seed: u64,
) -> Result<Splits<T>> {
    let sum = train_ratio + val_ratio + test_ratio;
    if (sum - 1.0).abs() > RATIO_TOLERANCE {
        bail!(
            "Split ratios must sum to 1.0 (got {} + {} + {} = {})",
            train_ratio,
            val_ratio,
            test_ratio,
            sum
        );
    }

    let n = records.len();
    if n < TINY_DATASET_LIMIT {
        println!(
            "  Warning: small dataset ({} examples); using all for train and reusing one record for validation/test",
            n
        );
        let reused: Vec<T> = records.first().cloned().into_iter().collect();
        return Ok(Splits {
            train: records,
            validation: reused.clone(),
            test: reused,
        });
    }

    let test_size = ((n as f64 * test_ratio).floor() as usize).max(1);
    let val_size = ((n as f64 * val_ratio).floor() as usize).max(1);
    let pool_size = test_size + val_size;
    // Ratios can sum to 1 yet starve train (e.g. test_ratio near 1 with
    // the minimum-1 bump on validation).
    if pool_size >= n {
        bail!(
            "Split ratios leave no training records: validation+test would take {} of {} records",
            pool_size,
            n
        );
    }

    // First partition: train vs combined val+test pool.
    let mut shuffled = records;
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);
    let mut pool = shuffled.split_off(n - pool_size);
    let train = shuffled;

    // Second partition of the pool, reseeded with the same seed. A pool
    // of fewer than 2 records cannot be split further; both validation
    // and test then reuse it (policy fallback, not an error).
    let (validation, test) = if pool.len() < 2 {
        (pool.clone(), pool)
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        pool.shuffle(&mut rng);
        let test = pool.split_off(pool.len() - test_size);
        (pool, test)
    };

    Ok(Splits {
        train,
        validation,
        test,
    })
}
