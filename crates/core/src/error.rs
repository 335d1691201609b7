//! Error type shared by configuration, sweep and reduction code

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SweepError>;

/// Everything that can go wrong before or around a sweep
///
/// The trial loop itself has no failure modes; all of these are raised either
/// while validating a [`crate::SweepConfig`] or while workers exchange their
/// partial tables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    #[error("forest size must be at least 2, got {0}")]
    ForestTooSmall(usize),

    #[error("at least 2 probabilities are needed to form a step, got {0}")]
    TooFewProbabilities(usize),

    #[error("probability range [{min}, {max}] must be ordered and inside [0, 1]")]
    InvalidProbabilityRange { min: f64, max: f64 },

    #[error("trial count must be positive")]
    NoTrials,

    #[error("ignition point ({row}, {col}) lies outside a {size}x{size} forest")]
    IgnitionOutOfBounds { row: usize, col: usize, size: usize },

    #[error("worker group needs at least one worker")]
    NoWorkers,

    #[error("worker rank {rank} is outside a group of {size}")]
    InvalidRank { rank: usize, size: usize },

    #[error("worker {rank} contributed {actual} values, expected {expected}")]
    ReductionLengthMismatch {
        rank: usize,
        expected: usize,
        actual: usize,
    },

    #[error("worker {rank} left the group before the reduction completed")]
    PeerDisconnected { rank: usize },

    #[error("coordinator received no reduction result")]
    MissingResult,

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}
