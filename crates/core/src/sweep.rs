//! Monte Carlo sweep over spread probabilities
//!
//! For every sampled probability a worker runs its strided share of the
//! trials on one reused grid and keeps a partial average. The partial tables
//! of all workers are later summed by [`crate::reduction`].

use crate::config::{SweepConfig, WorkerAssignment};
use crate::error::{Result, SweepError};
use crate::simulation::Simulator;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One worker's normalized results, one entry per probability
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartialTable {
    /// Partial average burned fraction
    pub burned: Vec<f64>,
    /// Partial average ticks until extinguishment
    pub iterations: Vec<f64>,
}

impl PartialTable {
    /// All-zero table for `n_probs` probabilities
    pub fn zeros(n_probs: usize) -> Self {
        Self {
            burned: vec![0.0; n_probs],
            iterations: vec![0.0; n_probs],
        }
    }

    /// Number of probabilities covered
    pub fn len(&self) -> usize {
        self.burned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.burned.is_empty()
    }

    /// Flatten into `burned ++ iterations` so both columns travel in one
    /// reduction
    pub fn to_wire(&self) -> Vec<f64> {
        let mut wire = Vec::with_capacity(self.burned.len() * 2);
        wire.extend_from_slice(&self.burned);
        wire.extend_from_slice(&self.iterations);
        wire
    }

    /// Inverse of [`PartialTable::to_wire`]
    ///
    /// # Errors
    ///
    /// Fails if `wire` is not exactly `2 × n_probs` long.
    pub fn from_wire(wire: &[f64], n_probs: usize) -> Result<Self> {
        if wire.len() != n_probs * 2 {
            return Err(SweepError::ReductionLengthMismatch {
                rank: 0,
                expected: n_probs * 2,
                actual: wire.len(),
            });
        }
        let (burned, iterations) = wire.split_at(n_probs);
        Ok(Self {
            burned: burned.to_vec(),
            iterations: iterations.to_vec(),
        })
    }
}

/// A single worker's pass over every probability
pub struct MonteCarloSweep<'a, R: Rng> {
    config: &'a SweepConfig,
    assignment: WorkerAssignment,
    simulator: Simulator<R>,
}

impl<'a, R: Rng> MonteCarloSweep<'a, R> {
    /// `simulator` must have been built for `config.forest_size`; the config
    /// is assumed to have passed [`SweepConfig::validate`].
    pub fn new(config: &'a SweepConfig, assignment: WorkerAssignment, simulator: Simulator<R>) -> Self {
        debug_assert_eq!(simulator.grid().size(), config.forest_size);
        Self {
            config,
            assignment,
            simulator,
        }
    }

    /// Run every local trial for every probability
    pub fn run(&mut self) -> PartialTable {
        let config = self.config;
        let workers = self.assignment.size();
        let local_trials = self.assignment.local_trial_count(config.n_trials_total);
        let divisor = config
            .normalization
            .divisor(local_trials, workers, config.n_trials_total);

        info!(
            "Worker {}/{} starting sweep: {} probabilities x {} local trials",
            self.assignment.rank(),
            workers,
            config.n_probs,
            local_trials
        );

        let mut table = PartialTable::zeros(config.n_probs);
        for index in 0..config.n_probs {
            let probability = config.probability(index);
            let mut burned_sum = 0.0;
            let mut iteration_sum = 0.0;

            for _trial in self.assignment.trial_indices(config.n_trials_total) {
                let outcome = self.simulator.run_trial(probability, config.ignition);
                burned_sum += outcome.burned_fraction;
                iteration_sum += outcome.iterations as f64;
            }

            if let Some(divisor) = divisor {
                table.burned[index] = burned_sum / divisor;
                table.iterations[index] = iteration_sum / divisor;
            }

            debug!(
                "Worker {}: p={:.6} partial burned={:.6} iterations={:.3}",
                self.assignment.rank(),
                probability,
                table.burned[index],
                table.iterations[index]
            );
        }

        info!("Worker {} finished sweep", self.assignment.rank());
        table
    }
}
