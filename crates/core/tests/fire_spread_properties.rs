//! Behavioural properties of the forest grid and single-trial driver
//!
//! Covers the state machine guarantees a sweep relies on: cells never
//! regress, every fire goes out, the 0 and 1 spread probabilities give exact
//! answers, and the random stream is consumed one draw per in-grid neighbour.

use approx::assert_relative_eq;
use ctor::ctor;
use forest_fire_core::{CellState, ForestGrid, Ignition, Simulator};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Wraps a generator and counts how many words were pulled from it
struct CountingRng {
    inner: StdRng,
    words: usize,
}

impl CountingRng {
    fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            words: 0,
        }
    }
}

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        self.words += 1;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.words += 1;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.words += 1;
        self.inner.fill_bytes(dest);
    }
}

fn neighbour_count(size: usize, row: usize, col: usize) -> usize {
    usize::from(row > 0)
        + usize::from(row + 1 < size)
        + usize::from(col > 0)
        + usize::from(col + 1 < size)
}

#[test]
fn test_cells_never_regress() {
    let size = 12;
    let mut rng = StdRng::seed_from_u64(2024);

    for probability in [0.2, 0.45, 0.6, 0.9] {
        let mut grid = ForestGrid::new(size);
        grid.ignite(4, 7);
        while grid.is_burning() {
            let before = grid.cells().to_vec();
            grid.step(probability, &mut rng);
            for (index, (old, new)) in before.iter().zip(grid.cells()).enumerate() {
                assert!(
                    new.index() >= old.index(),
                    "cell {index} went from {old:?} to {new:?} at p={probability}"
                );
            }
        }
    }
}

#[test]
fn test_every_fire_goes_out() {
    for size in 1..=9 {
        for probability in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let mut sim = Simulator::seeded(size, size as u64 * 31);
            let ignition = Ignition::centre(size);
            let outcome = sim.run_trial(probability, ignition);

            assert!(!sim.grid().is_burning());
            // A cell lit after d ticks is burnt by tick d + 2, and no fire path
            // is longer than the number of cells.
            assert!(
                outcome.iterations <= size * size + 1,
                "N={size} p={probability} took {} ticks",
                outcome.iterations
            );
            assert_eq!(
                sim.grid().count(CellState::Smoldering) + sim.grid().count(CellState::Burning),
                0
            );
        }
    }
}

#[test]
fn test_zero_spread_burns_only_the_ignition_tree() {
    for size in [2, 5, 20] {
        let mut sim = Simulator::seeded(size, 11);
        let fraction = sim.run(0.0, Ignition::new(size - 1, 0));
        assert_relative_eq!(fraction, 0.0);
        assert_eq!(sim.grid().count(CellState::Burnt), 1);
        assert_eq!(sim.grid().count(CellState::Unburnt), size * size - 1);
    }
}

#[test]
fn test_full_spread_burns_everything() {
    for size in 2..=10 {
        let mut sim = Simulator::seeded(size, 3);
        let fraction = sim.run(1.0, Ignition::new(size / 3, size - 1));
        assert_relative_eq!(fraction, 1.0);
        assert_eq!(sim.grid().count(CellState::Burnt), size * size);
    }
}

#[test]
fn test_reference_scenario_zero_spread() {
    let mut sim = Simulator::seeded(20, 0);
    assert_relative_eq!(sim.run(0.0, Ignition::new(10, 10)), 0.0);
}

#[test]
fn test_reference_scenario_two_by_two() {
    let mut sim = Simulator::seeded(2, 0);
    assert_relative_eq!(sim.run(1.0, Ignition::new(0, 0)), 1.0);
    assert!(sim.grid().cells().iter().all(|&cell| cell == CellState::Burnt));
}

#[test]
fn test_draw_count_depends_only_on_burning_cells() {
    let size = 10;
    for probability in [0.0, 0.3, 0.7, 1.0] {
        let mut grid = ForestGrid::new(size);
        let mut rng = CountingRng::new(77);
        grid.ignite(0, 0);
        grid.ignite(5, 5);

        while grid.is_burning() {
            // Cells smoldering now are exactly the ones burning after phase 1.
            let expected: usize = (0..size)
                .flat_map(|row| (0..size).map(move |col| (row, col)))
                .filter(|&(row, col)| grid.cell(row, col) == CellState::Smoldering)
                .map(|(row, col)| neighbour_count(size, row, col))
                .sum();

            let words_before = rng.words;
            let report = grid.step(probability, &mut rng);
            assert_eq!(report.draws, expected, "p={probability}");
            assert_eq!(rng.words - words_before, expected, "p={probability}");
        }
    }
}

#[test]
fn test_printed_forest_after_full_burn() {
    let mut sim = Simulator::seeded(3, 1);
    sim.run(1.0, Ignition::new(1, 1));
    assert_eq!(sim.grid().to_string(), "...\n...\n...\n");
}
