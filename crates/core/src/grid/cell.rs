//! Cell state machine for the forest grid
//!
//! A cell only ever moves forward along
//! `Unburnt → Smoldering → Burning → Burnt` within a trial. The derived `Ord`
//! follows the same order, so "never regresses" is a plain `>=` comparison.

use serde::{Deserialize, Serialize};

/// State of a single tree in the forest grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    /// Not yet reached by the fire
    #[default]
    Unburnt = 0,
    /// Caught fire this tick, starts burning on the next one
    Smoldering = 1,
    /// Actively burning, can spread to its four neighbours
    Burning = 2,
    /// Consumed, can never ignite again
    Burnt = 3,
}

impl CellState {
    /// Position of the state along the burn chain (0..=3)
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// True for `Smoldering` and `Burning`, the states that keep a trial alive
    #[inline]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Smoldering | Self::Burning)
    }

    /// Single-character glyph used when printing a forest
    pub const fn glyph(self) -> char {
        match self {
            Self::Unburnt => 'Y',
            Self::Smoldering => 'S',
            Self::Burning => 'B',
            Self::Burnt => '.',
        }
    }

    /// State reached after the decay/ignite phase of one tick
    ///
    /// `Burning` burns down, `Smoldering` bursts into flame, everything else
    /// is unchanged.
    #[inline]
    pub const fn advanced(self) -> Self {
        match self {
            Self::Smoldering => Self::Burning,
            Self::Burning | Self::Burnt => Self::Burnt,
            Self::Unburnt => Self::Unburnt,
        }
    }
}
