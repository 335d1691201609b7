//! Worker group and the end-of-run sum reduction
//!
//! Workers share nothing while trials run. Once a worker has finished every
//! probability it takes part in exactly one collective call,
//! [`Collective::reduce_sum`], which adds all partial tables element-wise and
//! hands the result to the coordinator (rank 0). Everyone else gets `None`.
//!
//! [`Collective`] is the seam for whatever launches the workers.
//! [`SoloCollective`] covers a group of one, [`ChannelCollective`] an
//! in-process group of threads, and [`run_workers`] wires the latter up on a
//! dedicated thread pool.

use crate::config::{Normalization, SeedPolicy, SweepConfig, WorkerAssignment};
use crate::error::{Result, SweepError};
use crate::report::FinalTable;
use crate::simulation::Simulator;
use crate::sweep::{MonteCarloSweep, PartialTable};
use rayon::prelude::*;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};

/// Rank, size and one blocking sum-to-coordinator primitive
pub trait Collective {
    /// This worker's index, 0 is the coordinator
    fn rank(&self) -> usize;

    /// Number of workers in the group
    fn size(&self) -> usize;

    /// Element-wise sum of `local` across every worker
    ///
    /// Blocks until the sum is complete on the coordinator. Returns
    /// `Some(sum)` on rank 0 and `None` everywhere else.
    ///
    /// # Errors
    ///
    /// Fails if a contribution has a different length than the coordinator's
    /// or a worker disappears before contributing.
    fn reduce_sum(&self, local: &[f64]) -> Result<Option<Vec<f64>>>;
}

/// Group of a single worker; the reduction is the identity
#[derive(Debug, Clone, Copy, Default)]
pub struct SoloCollective;

impl Collective for SoloCollective {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn reduce_sum(&self, local: &[f64]) -> Result<Option<Vec<f64>>> {
        Ok(Some(local.to_vec()))
    }
}

type Contribution = (usize, Vec<f64>);

/// One endpoint of an in-process worker group
///
/// Non-coordinators hold a sender to the coordinator; the coordinator holds
/// the only receiver and no sender, so it sees a disconnect as soon as every
/// peer has either contributed or gone away.
#[derive(Debug)]
pub struct ChannelCollective {
    rank: usize,
    size: usize,
    to_coordinator: Option<Sender<Contribution>>,
    inbox: Option<Receiver<Contribution>>,
}

impl ChannelCollective {
    /// Create all `size` endpoints of a group, indexed by rank
    ///
    /// # Errors
    ///
    /// Fails for an empty group.
    pub fn group(size: usize) -> Result<Vec<Self>> {
        if size == 0 {
            return Err(SweepError::NoWorkers);
        }
        let (sender, receiver) = mpsc::channel();
        let mut inbox = Some(receiver);
        let endpoints = (0..size)
            .map(|rank| {
                if rank == 0 {
                    Self {
                        rank,
                        size,
                        to_coordinator: None,
                        inbox: inbox.take(),
                    }
                } else {
                    Self {
                        rank,
                        size,
                        to_coordinator: Some(sender.clone()),
                        inbox: None,
                    }
                }
            })
            .collect();
        Ok(endpoints)
    }

    fn gather(&self, inbox: &Receiver<Contribution>, local: &[f64]) -> Result<Vec<f64>> {
        let mut slots: Vec<Option<Vec<f64>>> = vec![None; self.size];
        slots[0] = Some(local.to_vec());
        let mut pending = self.size - 1;

        while pending > 0 {
            let Ok((rank, values)) = inbox.recv() else {
                let missing = slots.iter().position(Option::is_none).unwrap_or(0);
                return Err(SweepError::PeerDisconnected { rank: missing });
            };
            if rank == 0 || rank >= self.size {
                return Err(SweepError::InvalidRank {
                    rank,
                    size: self.size,
                });
            }
            if values.len() != local.len() {
                return Err(SweepError::ReductionLengthMismatch {
                    rank,
                    expected: local.len(),
                    actual: values.len(),
                });
            }
            debug!("Coordinator received partial table from worker {}", rank);
            if slots[rank].replace(values).is_none() {
                pending -= 1;
            }
        }

        // Sum in rank order so the result does not depend on arrival order.
        let mut total = vec![0.0; local.len()];
        for values in slots.iter().flatten() {
            for (sum, value) in total.iter_mut().zip(values) {
                *sum += value;
            }
        }
        Ok(total)
    }
}

impl Collective for ChannelCollective {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn reduce_sum(&self, local: &[f64]) -> Result<Option<Vec<f64>>> {
        if let Some(inbox) = &self.inbox {
            return self.gather(inbox, local).map(Some);
        }
        match &self.to_coordinator {
            Some(sender) => sender
                .send((self.rank, local.to_vec()))
                .map(|()| None)
                .map_err(|_| SweepError::PeerDisconnected { rank: 0 }),
            None => Err(SweepError::PeerDisconnected { rank: 0 }),
        }
    }
}

/// Run one worker's sweep and take part in the reduction
///
/// This is what every member of a worker group executes, whatever launched
/// it. `base_seed` is shared by the group; each worker offsets it by rank.
///
/// # Errors
///
/// Propagates reduction failures, and rejects a collective whose rank is not
/// inside its size or that hands the reduced sum to a non-coordinator.
pub fn sweep_with<C: Collective>(
    config: &SweepConfig,
    collective: &C,
    base_seed: u64,
) -> Result<Option<FinalTable>> {
    let assignment = WorkerAssignment::new(collective.rank(), collective.size())?;
    let seed = SeedPolicy::worker_seed(base_seed, assignment.rank());
    let simulator = Simulator::seeded(config.forest_size, seed);

    let partial = MonteCarloSweep::new(config, assignment, simulator).run();
    let Some(sums) = collective.reduce_sum(&partial.to_wire())? else {
        return Ok(None);
    };
    if !assignment.is_coordinator() {
        return Err(SweepError::InvalidRank {
            rank: assignment.rank(),
            size: assignment.size(),
        });
    }

    let sums = PartialTable::from_wire(&sums, config.n_probs)?;
    Ok(Some(FinalTable::from_sums(config, &sums)))
}

/// Run a whole sweep on `workers` in-process workers and return the
/// coordinator's table
///
/// Each worker gets its own thread in a pool of exactly `workers` threads,
/// its own grid and its own generator.
///
/// # Errors
///
/// Fails on an invalid configuration, an empty group, a pool that cannot be
/// built, or a broken reduction.
pub fn run_workers(config: &SweepConfig, workers: usize, seeds: SeedPolicy) -> Result<FinalTable> {
    config.validate()?;
    let endpoints = ChannelCollective::group(workers)?;
    let base_seed = seeds.base_seed();

    if config.n_trials_total % workers != 0 && config.normalization == Normalization::Legacy {
        warn!(
            "{} trials do not divide evenly over {} workers; summed averages are approximate",
            config.n_trials_total, workers
        );
    }
    info!(
        "Starting sweep: {}x{} forest, {} probabilities, {} trials, {} workers, base seed {}",
        config.forest_size,
        config.forest_size,
        config.n_probs,
        config.n_trials_total,
        workers,
        base_seed
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("fire-worker-{index}"))
        .build()
        .map_err(|err| SweepError::WorkerPool(err.to_string()))?;

    let outcomes: Vec<Result<Option<FinalTable>>> = pool.install(|| {
        endpoints
            .into_par_iter()
            .map(|endpoint| sweep_with(config, &endpoint, base_seed))
            .collect()
    });

    let mut table = None;
    for outcome in outcomes {
        if let Some(reduced) = outcome? {
            table = Some(reduced);
        }
    }
    table.ok_or(SweepError::MissingResult)
}
