//! Sweep configuration and worker assignment
//!
//! Defaults reproduce the fixed constants of the reference runs: a 20×20
//! forest, 10 probabilities from 0.0 to 1.0, 100 trials, ignition at (10, 10).

use crate::error::{Result, SweepError};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default trees per row
pub const DEFAULT_FOREST_SIZE: usize = 20;
/// Default number of sampled spread probabilities
pub const DEFAULT_N_PROBS: usize = 10;
/// Default number of trials per probability, across all workers
pub const DEFAULT_N_TRIALS: usize = 100;
/// Default ignition row and column
pub const DEFAULT_IGNITION: usize = 10;

/// Grid coordinates of the first lit tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ignition {
    pub row: usize,
    pub col: usize,
}

impl Ignition {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Centre of a `size × size` forest
    pub const fn centre(size: usize) -> Self {
        Self::new(size / 2, size / 2)
    }
}

/// How a worker turns its local sum into a partial average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Divide by `local_trials × workers`
    ///
    /// Summing these across workers is only the grand mean when the trial
    /// count divides evenly by the worker count. Matches historical tables.
    #[default]
    Legacy,
    /// Divide by the global trial count, so the cross-worker sum is the mean
    Exact,
}

impl Normalization {
    /// Divisor applied to a worker's local sum
    ///
    /// Returns `None` when the worker ran no trials, in which case its
    /// contribution is zero.
    pub fn divisor(self, local_trials: usize, workers: usize, total_trials: usize) -> Option<f64> {
        if local_trials == 0 {
            return None;
        }
        Some(match self {
            Self::Legacy => (local_trials * workers) as f64,
            Self::Exact => total_trials as f64,
        })
    }
}

/// Where each worker's random stream starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Wall-clock seconds, offset by rank
    #[default]
    TimeBased,
    /// Fixed base seed, offset by rank
    Fixed(u64),
}

impl SeedPolicy {
    /// Resolve to a concrete base seed, reading the clock at most once
    pub fn base_seed(self) -> u64 {
        match self {
            Self::TimeBased => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or_default(),
            Self::Fixed(seed) => seed,
        }
    }

    /// Per-worker seed derived from a resolved base seed
    pub fn worker_seed(base: u64, rank: usize) -> u64 {
        base.wrapping_add(rank as u64)
    }
}

/// Parameters of a full Monte Carlo sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Trees per row and column (N)
    pub forest_size: usize,
    /// Lowest sampled spread probability
    pub prob_min: f64,
    /// Highest sampled spread probability
    pub prob_max: f64,
    /// Number of linearly spaced probabilities, at least 2
    pub n_probs: usize,
    /// Trials per probability across the whole worker group
    pub n_trials_total: usize,
    /// First lit tree
    pub ignition: Ignition,
    /// Partial-average divisor
    pub normalization: Normalization,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            forest_size: DEFAULT_FOREST_SIZE,
            prob_min: 0.0,
            prob_max: 1.0,
            n_probs: DEFAULT_N_PROBS,
            n_trials_total: DEFAULT_N_TRIALS,
            ignition: Ignition::new(DEFAULT_IGNITION, DEFAULT_IGNITION),
            normalization: Normalization::Legacy,
        }
    }
}

impl SweepConfig {
    /// Check every precondition the trial loop relies on
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition: forest smaller than 2×2,
    /// fewer than 2 probabilities, a probability range outside `[0, 1]` or
    /// inverted, zero trials, or an ignition point off the grid.
    pub fn validate(&self) -> Result<()> {
        if self.forest_size < 2 {
            return Err(SweepError::ForestTooSmall(self.forest_size));
        }
        if self.n_probs < 2 {
            return Err(SweepError::TooFewProbabilities(self.n_probs));
        }
        let in_unit = |p: f64| (0.0..=1.0).contains(&p);
        if !in_unit(self.prob_min) || !in_unit(self.prob_max) || self.prob_min > self.prob_max {
            return Err(SweepError::InvalidProbabilityRange {
                min: self.prob_min,
                max: self.prob_max,
            });
        }
        if self.n_trials_total == 0 {
            return Err(SweepError::NoTrials);
        }
        let Ignition { row, col } = self.ignition;
        if row >= self.forest_size || col >= self.forest_size {
            return Err(SweepError::IgnitionOutOfBounds {
                row,
                col,
                size: self.forest_size,
            });
        }
        Ok(())
    }

    /// Spacing between consecutive probabilities
    pub fn probability_step(&self) -> f64 {
        (self.prob_max - self.prob_min) / (self.n_probs - 1) as f64
    }

    /// Spread probability sampled at `index`
    pub fn probability(&self, index: usize) -> f64 {
        self.prob_min + index as f64 * self.probability_step()
    }

    /// All sampled spread probabilities in sweep order
    pub fn probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.n_probs).map(|index| self.probability(index))
    }
}

/// One worker's place in the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerAssignment {
    rank: usize,
    size: usize,
}

impl WorkerAssignment {
    /// # Errors
    ///
    /// Fails when `size` is zero or `rank` is not below `size`.
    pub fn new(rank: usize, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(SweepError::NoWorkers);
        }
        if rank >= size {
            return Err(SweepError::InvalidRank { rank, size });
        }
        Ok(Self { rank, size })
    }

    /// The only worker of a group of one
    pub const fn solo() -> Self {
        Self { rank: 0, size: 1 }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }

    /// Global trial indices `{rank, rank + W, rank + 2W, …}` below `total`
    pub fn trial_indices(&self, total: usize) -> impl Iterator<Item = usize> {
        (self.rank..total).step_by(self.size)
    }

    /// `ceil((total - rank) / W)`, zero when `rank >= total`
    pub fn local_trial_count(&self, total: usize) -> usize {
        total.saturating_sub(self.rank).div_ceil(self.size)
    }
}
