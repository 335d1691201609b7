//! Square forest grid and the one-tick transition rule
//!
//! The grid is a flat row-major `Vec<CellState>` with stride `size`. It is
//! allocated once and reset between trials, never reallocated.
//!
//! # Step Rule
//!
//! One call to [`ForestGrid::step`] applies two phases over the whole grid:
//! 1. Decay/ignite: `Burning → Burnt`, `Smoldering → Burning`
//! 2. Spread: every cell that is now `Burning` tries each in-grid neighbour
//!    in the order north, south, west, east
//!
//! Each neighbour attempt consumes exactly one uniform draw in `[0, 1)`
//! *before* the neighbour's state is looked at, so the number of draws per
//! tick depends only on where the fire is, not on what it is next to.

use super::cell::CellState;
use rand::Rng;
use std::fmt;

/// What one tick did, for callers that want to observe the random stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Uniform draws consumed by the spread phase
    pub draws: usize,
    /// Cells that went `Unburnt → Smoldering` this tick
    pub ignitions: usize,
}

/// N×N matrix of cell states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestGrid {
    /// Cell states in row-major order (row * size + col)
    cells: Vec<CellState>,
    /// Trees per row and per column
    size: usize,
}

impl ForestGrid {
    /// Allocate an all-`Unburnt` grid of `size × size` cells
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![CellState::Unburnt; size * size],
            size,
        }
    }

    /// Trees per row (N)
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// All cell states in row-major order
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// State at (`row`, `col`)
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is outside `[0, size)`
    pub fn cell(&self, row: usize, col: usize) -> CellState {
        assert!(
            row < self.size && col < self.size,
            "Coordinates out of bounds"
        );
        self.cells[row * self.size + col]
    }

    /// Set every cell back to `Unburnt`
    pub fn reset(&mut self) {
        self.cells.fill(CellState::Unburnt);
    }

    /// Light the tree at (`row`, `col`), making it `Smoldering`
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is outside `[0, size)`. The sweep
    /// validates its ignition point once up front.
    pub fn ignite(&mut self, row: usize, col: usize) {
        assert!(
            row < self.size && col < self.size,
            "Ignition point out of bounds"
        );
        self.cells[row * self.size + col] = CellState::Smoldering;
    }

    /// Advance the whole grid by one tick
    ///
    /// # Arguments
    ///
    /// * `spread_probability` - Chance that a burning tree lights one
    ///   particular unburnt neighbour this tick
    /// * `rng` - Source of the per-direction uniform draws
    pub fn step<R: Rng + ?Sized>(&mut self, spread_probability: f64, rng: &mut R) -> StepReport {
        for cell in &mut self.cells {
            *cell = cell.advanced();
        }

        let n = self.size;
        let mut report = StepReport::default();

        for row in 0..n {
            for col in 0..n {
                if self.cells[row * n + col] != CellState::Burning {
                    continue;
                }

                if row != 0 {
                    self.try_spread(row - 1, col, spread_probability, rng, &mut report);
                }
                if row != n - 1 {
                    self.try_spread(row + 1, col, spread_probability, rng, &mut report);
                }
                if col != 0 {
                    self.try_spread(row, col - 1, spread_probability, rng, &mut report);
                }
                if col != n - 1 {
                    self.try_spread(row, col + 1, spread_probability, rng, &mut report);
                }
            }
        }

        report
    }

    // Draw first, look second: the draw is spent even if the neighbour
    // cannot catch.
    #[inline]
    fn try_spread<R: Rng + ?Sized>(
        &mut self,
        row: usize,
        col: usize,
        spread_probability: f64,
        rng: &mut R,
        report: &mut StepReport,
    ) {
        report.draws += 1;
        let spreads = rng.random::<f64>() < spread_probability;
        let target = &mut self.cells[row * self.size + col];
        if spreads && *target == CellState::Unburnt {
            *target = CellState::Smoldering;
            report.ignitions += 1;
        }
    }

    /// True while any cell is `Smoldering` or `Burning`
    pub fn is_burning(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_active())
    }

    /// Number of cells currently in `state`
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&cell| cell == state).count()
    }

    /// Fraction of the forest burned, `(burnt - 1) / (N² - 1)`
    ///
    /// The ignition tree is subtracted from the numerator but the denominator
    /// still excludes only one cell; results are kept comparable with the
    /// historical output tables. Yields NaN for a 1×1 grid.
    pub fn burned_fraction(&self) -> f64 {
        let total = (self.size * self.size) as f64 - 1.0;
        (self.count(CellState::Burnt) as f64 - 1.0) / total
    }
}

impl fmt::Display for ForestGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size.max(1)) {
            for cell in row {
                write!(f, "{}", cell.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
