// src/splits.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Train / test / validate partitioning.
//!
//! The retained catalog is shuffled uniformly and cut at two cumulative
//! boundaries, `⌊train·N⌋` and `⌊(1 − validate)·N⌋`. The slices keep the
//! shuffled order.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::fmt;

use crate::catalog::CatalogEntry;
use crate::constants::{TEST_RATIO, TRAIN_RATIO, VALIDATE_RATIO};
use crate::error::PrepError;

/// Dataset partition an entry is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Split {
    Train,
    Test,
    Validate,
}

impl Split {
    /// Dispatch order used by the orchestrator.
    pub const ALL: [Split; 3] = [Split::Train, Split::Test, Split::Validate];

    /// Key segment used in output paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
            Split::Validate => "validate",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ratio configuration for train/test/validate assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub test: f64,
    pub validate: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: TRAIN_RATIO,
            test: TEST_RATIO,
            validate: VALIDATE_RATIO,
        }
    }
}

impl SplitRatios {
    /// Validate that ratios are non-negative and sum to `1.0` (within epsilon).
    pub fn validated(self) -> Result<Self, PrepError> {
        if self.train < 0.0 || self.test < 0.0 || self.validate < 0.0 {
            return Err(PrepError::Config("split ratios must be non-negative".into()));
        }
        let sum = self.train + self.test + self.validate;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(PrepError::Config(format!(
                "split ratios must sum to 1.0, got {sum}"
            )));
        }
        Ok(self)
    }

    /// Cut indices for `n` items: train is `[0, a)`, test `[a, b)`,
    /// validate `[b, n)`.
    pub fn cut_points(&self, n: usize) -> (usize, usize) {
        let total = n as f64;
        let first = ((total * self.train).floor() as usize).min(n);
        let second = ((total * (1.0 - self.validate)).floor() as usize).clamp(first, n);
        (first, second)
    }
}

/// The three disjoint partitions of the retained catalog.
#[derive(Debug, Clone, Default)]
pub struct SplitSet {
    pub train: Vec<CatalogEntry>,
    pub test: Vec<CatalogEntry>,
    pub validate: Vec<CatalogEntry>,
}

impl SplitSet {
    pub fn get(&self, split: Split) -> &[CatalogEntry] {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
            Split::Validate => &self.validate,
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.test.len() + self.validate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(split, entry)` pairs in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = (Split, &CatalogEntry)> + '_ {
        Split::ALL
            .into_iter()
            .flat_map(move |split| self.get(split).iter().map(move |e| (split, e)))
    }
}

/// Shuffle `entries` and partition them. With `seed` the permutation is
/// reproducible; without it every run differs.
pub fn split_catalog(
    mut entries: Vec<CatalogEntry>,
    ratios: SplitRatios,
    seed: Option<u64>,
) -> SplitSet {
    match seed {
        Some(seed) => entries.shuffle(&mut ChaCha20Rng::seed_from_u64(seed)),
        None => entries.shuffle(&mut rand::rng()),
    }

    let (first, second) = ratios.cut_points(entries.len());
    let validate = entries.split_off(second);
    let test = entries.split_off(first);
    SplitSet {
        train: entries,
        test,
        validate,
    }
}
