//! Coordinator-side result table and its text rendering

use crate::config::SweepConfig;
use crate::sweep::PartialTable;
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Header line of the burned-fraction table
pub const BURNED_HEADER: &str = "Probability of fire spreading, Average percent burned";
/// Header line of the iterations table
pub const ITERATIONS_HEADER: &str = "Probability of fire spreading, Average iterations per trial";

/// One probability and its reduced values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalRow {
    pub probability: f64,
    /// Sum of every worker's partial average burned fraction
    pub burned: f64,
    /// Sum of every worker's partial average tick count
    pub iterations: f64,
}

/// Reduced sweep results, available on the coordinator only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalTable {
    pub rows: Vec<FinalRow>,
}

impl FinalTable {
    /// Pair the summed partial tables with their probabilities
    ///
    /// The sums are reported as-is; they are not divided by the worker count.
    pub fn from_sums(config: &SweepConfig, sums: &PartialTable) -> Self {
        let rows = config
            .probabilities()
            .zip(sums.burned.iter().zip(&sums.iterations))
            .map(|(probability, (&burned, &iterations))| FinalRow {
                probability,
                burned,
                iterations,
            })
            .collect();
        Self { rows }
    }

    /// Burned-fraction table, one `"p , value"` line per probability
    pub fn render(&self) -> String {
        self.render_column(BURNED_HEADER, |row| row.burned)
    }

    /// Average ticks until extinguishment, same layout as [`FinalTable::render`]
    pub fn render_iterations(&self) -> String {
        self.render_column(ITERATIONS_HEADER, |row| row.iterations)
    }

    fn render_column(&self, header: &str, value: impl Fn(&FinalRow) -> f64) -> String {
        let mut out = String::with_capacity(header.len() + 1 + self.rows.len() * 24);
        out.push_str(header);
        out.push('\n');
        for row in &self.rows {
            // Writing to a String cannot fail
            let _ = writeln!(out, "{:.6} , {:.6}", row.probability, value(row));
        }
        out
    }
}

impl fmt::Display for FinalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
