//! Single-trial driver
//!
//! A [`Simulator`] owns one forest grid and one random generator. Each call to
//! [`Simulator::run_trial`] resets the grid, lights the ignition tree and steps
//! until nothing is smoldering or burning. The grid is reused across trials.

use crate::config::Ignition;
use crate::grid::ForestGrid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Result of one fire from ignition to extinguishment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// `(burnt - 1) / (N² - 1)`
    pub burned_fraction: f64,
    /// Ticks taken before the fire went out
    pub iterations: usize,
}

/// Runs trials on a reused grid with an injected random source
#[derive(Debug, Clone)]
pub struct Simulator<R: Rng = StdRng> {
    grid: ForestGrid,
    rng: R,
}

impl Simulator<StdRng> {
    /// Simulator on a `size × size` grid with a seeded `StdRng`
    #[must_use]
    pub fn seeded(size: usize, seed: u64) -> Self {
        Self::new(ForestGrid::new(size), StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulator<R> {
    pub fn new(grid: ForestGrid, rng: R) -> Self {
        Self { grid, rng }
    }

    /// Grid as left by the most recent trial
    pub fn grid(&self) -> &ForestGrid {
        &self.grid
    }

    /// Burn one forest and report the burned fraction and tick count
    ///
    /// `ignition` must lie inside the grid.
    pub fn run_trial(&mut self, spread_probability: f64, ignition: Ignition) -> TrialOutcome {
        self.grid.reset();
        self.grid.ignite(ignition.row, ignition.col);

        let mut iterations = 0;
        while self.grid.is_burning() {
            self.grid.step(spread_probability, &mut self.rng);
            iterations += 1;
        }

        TrialOutcome {
            burned_fraction: self.grid.burned_fraction(),
            iterations,
        }
    }

    /// Burn one forest and return only the burned fraction
    pub fn run(&mut self, spread_probability: f64, ignition: Ignition) -> f64 {
        self.run_trial(spread_probability, ignition).burned_fraction
    }
}
