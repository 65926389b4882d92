#![no_std]

extern crate alloc;

use alloc::collections::BTreeSet;
use serde::{Deserialize, Serialize};

pub use error::*;
pub use generator::*;
pub use lake::*;
pub use patch::*;
pub use save::*;
pub use types::*;

mod error;
mod generator;
mod lake;
mod patch;
mod propagate;
mod save;
mod types;

/// Width of the always-revealed margin kept around the playing field.
pub const BORDER: Coord = 3;

/// Highest intelligence level that adds any deduction. Higher levels are accepted and behave
/// like this one.
pub const MAX_INTELLIGENCE: Intelligence = 3;

/// Classic minesweeper behavior: flood-fill from patches with nothing left to find around them.
pub const DEFAULT_INTELLIGENCE: Intelligence = 1;

/// Coordinates revealed by a single probe.
pub type Changes = BTreeSet<Coords>;

/// Validated parameters for a fresh game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LakeConfig {
    rows: Coord,
    cols: Coord,
    mines: CellCount,
    intelligence: Intelligence,
}

impl LakeConfig {
    /// Requires a non-empty field with at least one patch left free of mines.
    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        let total = checked_area(rows, cols)?;
        if mines >= total {
            return Err(GameError::TooManyMines);
        }

        Ok(Self {
            rows,
            cols,
            mines,
            intelligence: DEFAULT_INTELLIGENCE,
        })
    }

    pub const fn with_intelligence(self, intelligence: Intelligence) -> Self {
        Self {
            intelligence,
            ..self
        }
    }

    pub const fn rows(&self) -> Coord {
        self.rows
    }

    pub const fn cols(&self) -> Coord {
        self.cols
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn intelligence(&self) -> Intelligence {
        self.intelligence
    }

    pub const fn total_cells(&self) -> CellCount {
        self.rows as CellCount * self.cols as CellCount
    }
}

/// Number of patches in a `rows` by `cols` field, if both sides are usable.
///
/// Sides must be positive and leave room for the border margin in [`Coord`].
pub fn checked_area(rows: Coord, cols: Coord) -> Result<CellCount> {
    let usable = 1..=Coord::MAX - 2 * BORDER;
    if !usable.contains(&rows) || !usable.contains(&cols) {
        return Err(GameError::InvalidSize);
    }

    (rows as CellCount)
        .checked_mul(cols as CellCount)
        .ok_or(GameError::InvalidSize)
}

/// A probe whose claim did not match the patch. Ends the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boom {
    /// Patch touched in the fatal move.
    pub position: Coords,
    /// Moves made, including the fatal one.
    pub moves: CellCount,
    /// Whether the patch was actually mined.
    pub mined: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Every patch revealed by the probe, empty if nothing changed.
    Revealed(Changes),
    Boom(Boom),
}

impl ProbeOutcome {
    /// Whether this outcome could have caused an update to the game
    pub fn has_update(&self) -> bool {
        match self {
            Self::Revealed(changes) => !changes.is_empty(),
            Self::Boom(_) => true,
        }
    }

    pub const fn is_boom(&self) -> bool {
        matches!(self, Self::Boom(_))
    }
}
