//! Forest Fire Sweep Core Library
//!
//! Estimates how much of a square forest burns out from a single ignition
//! point, as a function of the probability that fire jumps between adjacent
//! trees. Each trial is a four-state cellular automaton
//! (`Unburnt → Smoldering → Burning → Burnt`); a sweep repeats trials over a
//! range of spread probabilities and averages the burned fraction.
//!
//! ## Layout
//!
//! - [`grid`]: cell states and the two-phase step rule
//! - [`simulation`]: one trial from ignition to extinguishment
//! - [`sweep`]: a worker's share of trials for every probability
//! - [`reduction`]: worker group and the end-of-run sum to the coordinator
//! - [`report`]: the coordinator's table and its text form

pub mod config;
pub mod error;
pub mod grid;
pub mod reduction;
pub mod report;
pub mod simulation;
pub mod sweep;

pub use config::{
    Ignition, Normalization, SeedPolicy, SweepConfig, WorkerAssignment, DEFAULT_FOREST_SIZE,
    DEFAULT_IGNITION, DEFAULT_N_PROBS, DEFAULT_N_TRIALS,
};
pub use error::{Result, SweepError};
pub use grid::{CellState, ForestGrid, StepReport};
pub use reduction::{run_workers, sweep_with, ChannelCollective, Collective, SoloCollective};
pub use report::{FinalRow, FinalTable};
pub use simulation::{Simulator, TrialOutcome};
pub use sweep::{MonteCarloSweep, PartialTable};
