//! End-to-end sweeps across worker groups
//!
//! Checks that the coordinator's table is the index-wise sum of every
//! worker's partial table, that the legacy and exact normalizations diverge
//! only when the trial count does not divide by the worker count, and that a
//! fixed seed reproduces the same table.

use approx::assert_relative_eq;
use ctor::ctor;
use forest_fire_core::{
    run_workers, sweep_with, FinalTable, Ignition, MonteCarloSweep, Normalization, PartialTable,
    SeedPolicy, Simulator, SoloCollective, SweepConfig, WorkerAssignment,
};

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config(n_trials_total: usize, normalization: Normalization) -> SweepConfig {
    SweepConfig {
        forest_size: 8,
        n_probs: 5,
        n_trials_total,
        ignition: Ignition::new(4, 4),
        normalization,
        ..SweepConfig::default()
    }
}

fn partial(config: &SweepConfig, rank: usize, workers: usize, base_seed: u64) -> PartialTable {
    let assignment = WorkerAssignment::new(rank, workers).unwrap();
    let seed = SeedPolicy::worker_seed(base_seed, rank);
    MonteCarloSweep::new(config, assignment, Simulator::seeded(config.forest_size, seed)).run()
}

#[test]
fn test_coordinator_table_is_sum_of_partials() {
    let config = config(12, Normalization::Legacy);
    let workers = 3;
    let table = run_workers(&config, workers, SeedPolicy::Fixed(500)).unwrap();

    let mut expected = PartialTable::zeros(config.n_probs);
    for rank in 0..workers {
        let part = partial(&config, rank, workers, 500);
        for index in 0..config.n_probs {
            expected.burned[index] += part.burned[index];
            expected.iterations[index] += part.iterations[index];
        }
    }

    assert_eq!(table.rows.len(), config.n_probs);
    for (row, (burned, iterations)) in table
        .rows
        .iter()
        .zip(expected.burned.iter().zip(&expected.iterations))
    {
        assert_relative_eq!(row.burned, *burned, epsilon = 1e-12);
        assert_relative_eq!(row.iterations, *iterations, epsilon = 1e-12);
    }
}

#[test]
fn test_single_worker_matches_solo_collective() {
    let config = config(7, Normalization::Legacy);
    let threaded = run_workers(&config, 1, SeedPolicy::Fixed(9)).unwrap();
    let solo = sweep_with(&config, &SoloCollective, 9).unwrap().unwrap();
    assert_eq!(threaded, solo);
}

#[test]
fn test_fixed_seed_is_reproducible() {
    let config = config(20, Normalization::Legacy);
    let first = run_workers(&config, 4, SeedPolicy::Fixed(123)).unwrap();
    let second = run_workers(&config, 4, SeedPolicy::Fixed(123)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_probability_endpoints_are_exact_when_evenly_divided() {
    let config = config(12, Normalization::Legacy);
    let table = run_workers(&config, 4, SeedPolicy::Fixed(1)).unwrap();

    let first = table.rows.first().unwrap();
    assert_relative_eq!(first.probability, 0.0);
    assert_relative_eq!(first.burned, 0.0);
    assert_relative_eq!(first.iterations, 2.0, epsilon = 1e-12);

    let last = table.rows.last().unwrap();
    assert_relative_eq!(last.probability, 1.0);
    assert_relative_eq!(last.burned, 1.0, epsilon = 1e-12);
}

#[test]
fn test_normalizations_diverge_on_uneven_split() {
    // 10 trials on 4 workers (3, 3, 2, 2): at p = 0 every trial takes 2 ticks
    // and both divisors still recover the mean.
    let legacy = run_workers(&config(10, Normalization::Legacy), 4, SeedPolicy::Fixed(5)).unwrap();
    let exact = run_workers(&config(10, Normalization::Exact), 4, SeedPolicy::Fixed(5)).unwrap();
    assert_relative_eq!(legacy.rows[0].iterations, 2.0, epsilon = 1e-12);
    assert_relative_eq!(exact.rows[0].iterations, 2.0, epsilon = 1e-12);

    // 3 trials on 4 workers: ranks 0..=2 run one trial each, rank 3 none.
    // Legacy: 3 × (2 / (1 × 4)) = 1.5 ticks; exact: 3 × 2 / 3 = 2.
    let legacy = run_workers(&config(3, Normalization::Legacy), 4, SeedPolicy::Fixed(5)).unwrap();
    let exact = run_workers(&config(3, Normalization::Exact), 4, SeedPolicy::Fixed(5)).unwrap();
    assert_relative_eq!(legacy.rows[0].iterations, 1.5, epsilon = 1e-12);
    assert_relative_eq!(exact.rows[0].iterations, 2.0, epsilon = 1e-12);
    assert_relative_eq!(legacy.rows[4].burned, 0.75, epsilon = 1e-12);
    assert_relative_eq!(exact.rows[4].burned, 1.0, epsilon = 1e-12);
}

#[test]
fn test_invalid_config_is_rejected_before_running() {
    let bad = SweepConfig {
        n_probs: 1,
        ..SweepConfig::default()
    };
    assert!(run_workers(&bad, 2, SeedPolicy::Fixed(0)).is_err());
    assert!(run_workers(&SweepConfig::default(), 0, SeedPolicy::Fixed(0)).is_err());
}

#[test]
fn test_rendered_table_shape() {
    let config = config(4, Normalization::Legacy);
    let table: FinalTable = run_workers(&config, 2, SeedPolicy::Fixed(77)).unwrap();
    let text = table.render();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), config.n_probs + 1);
    assert_eq!(
        lines[0],
        "Probability of fire spreading, Average percent burned"
    );
    assert_eq!(lines[1], "0.000000 , 0.000000");
    assert!(lines[3].starts_with("0.500000 , "));
    assert_eq!(lines[5], "1.000000 , 1.000000");

    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["rows"].as_array().unwrap().len(), config.n_probs);
}
