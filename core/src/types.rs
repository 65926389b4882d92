use core::fmt;
use serde::{Deserialize, Serialize};

/// Single coordinate axis. Signed, since the border margin lives at negative positions.
pub type Coord = i32;

/// Count type used for mine counts, cell counts and moves.
pub type CellCount = u32;

/// Deduction depth applied after each probe.
pub type Intelligence = u32;

/// Position of a patch, `row` being the "y coordinate" and `col` the "x coordinate".
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coords {
    pub row: Coord,
    pub col: Coord,
}

impl Coords {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    /// Whether `other` is this position or one of its eight neighbors.
    pub const fn touches(self, other: Coords) -> bool {
        (self.row - other.row).abs() <= 1 && (self.col - other.col).abs() <= 1
    }

    pub const fn shares_line_with(self, other: Coords) -> bool {
        self.row == other.row || self.col == other.col
    }

    pub(crate) fn to_nd_index(self, offset: Coord) -> [usize; 2] {
        [
            (self.row + offset) as usize,
            (self.col + offset) as usize,
        ]
    }
}

impl From<(Coord, Coord)> for Coords {
    fn from((row, col): (Coord, Coord)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Iterates the square of positions within `radius` of a center, clipped to an extent.
///
/// Yields in row-major order. The center itself is skipped unless requested.
#[derive(Clone, Debug)]
pub struct ZoneIter {
    center: Coords,
    include_center: bool,
    left: Coord,
    right: Coord,
    bottom: Coord,
    cursor: Coords,
}

impl ZoneIter {
    /// `lower` is inclusive, `upper` exclusive.
    pub(crate) fn new(
        center: Coords,
        radius: Coord,
        include_center: bool,
        lower: Coords,
        upper: Coords,
    ) -> Self {
        let top = lower.row.max(center.row - radius);
        let left = lower.col.max(center.col - radius);
        Self {
            center,
            include_center,
            left,
            right: upper.col.min(center.col + radius + 1),
            bottom: upper.row.min(center.row + radius + 1),
            cursor: Coords::new(top, left),
        }
    }
}

impl Iterator for ZoneIter {
    type Item = Coords;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor.row >= self.bottom || self.left >= self.right {
                return None;
            }

            let current = self.cursor;
            self.cursor.col += 1;
            if self.cursor.col >= self.right {
                self.cursor.col = self.left;
                self.cursor.row += 1;
            }

            if self.include_center || current != self.center {
                return Some(current);
            }
        }
    }
}
