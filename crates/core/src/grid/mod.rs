//! Forest grid: cell states and the discrete spread rule

pub mod cell;
pub mod forest;

pub use cell::CellState;
pub use forest::{ForestGrid, StepReport};
