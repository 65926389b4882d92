use ndarray::Array2;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use crate::*;
pub use random::*;

mod random;

pub trait MinefieldGenerator {
    fn generate(self, config: &LakeConfig) -> Minefield;
}

/// Mine placement for a lake, before any patch is revealed.
///
/// At least one patch is always left free of mines.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Minefield {
    mines: Array2<bool>,
    count: CellCount,
}

impl Minefield {
    pub(crate) fn from_mask(mines: Array2<bool>) -> Self {
        let count = mines.iter().filter(|&&mined| mined).count() as CellCount;
        Self { mines, count }
    }

    /// Checks the mask dimensions and that some patch is left free.
    pub fn from_mine_mask(mines: Array2<bool>) -> Result<Self> {
        let (rows, cols) = mines.dim();
        let rows = Coord::try_from(rows).map_err(|_| GameError::InvalidSize)?;
        let cols = Coord::try_from(cols).map_err(|_| GameError::InvalidSize)?;
        let total = checked_area(rows, cols)?;

        let field = Self::from_mask(mines);
        if field.count >= total {
            return Err(GameError::TooManyMines);
        }
        Ok(field)
    }

    pub fn from_mine_coords(rows: Coord, cols: Coord, mine_coords: &[Coords]) -> Result<Self> {
        checked_area(rows, cols)?;
        let mut mines: Array2<bool> = Array2::default([rows as usize, cols as usize]);

        for &coords in mine_coords {
            if !(0..rows).contains(&coords.row) || !(0..cols).contains(&coords.col) {
                return Err(GameError::InvalidCoords);
            }
            mines[coords.to_nd_index(0)] = true;
        }

        Self::from_mine_mask(mines)
    }

    pub fn rows(&self) -> Coord {
        self.mines.dim().0 as Coord
    }

    pub fn cols(&self) -> Coord {
        self.mines.dim().1 as Coord
    }

    pub fn mine_count(&self) -> CellCount {
        self.count
    }

    /// Out-of-field positions are never mined.
    pub fn contains_mine(&self, coords: Coords) -> bool {
        (0..self.rows()).contains(&coords.row)
            && (0..self.cols()).contains(&coords.col)
            && self.mines[coords.to_nd_index(0)]
    }

    /// Mined positions in row-major order.
    pub fn iter_mines(&self) -> impl Iterator<Item = Coords> + '_ {
        self.mines
            .indexed_iter()
            .filter(|&(_, &mined)| mined)
            .map(|((row, col), _)| Coords::new(row as Coord, col as Coord))
    }
}

impl<'de> Deserialize<'de> for Minefield {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Layout {
            mines: Array2<bool>,
            count: CellCount,
        }

        let layout = Layout::deserialize(deserializer)?;
        let field = Minefield::from_mine_mask(layout.mines).map_err(de::Error::custom)?;
        if field.count != layout.count {
            return Err(de::Error::invalid_value(
                Unexpected::Unsigned(layout.count.into()),
                &"the number of mines in the layout",
            ));
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn from_mine_coords_counts_duplicates_once() {
        let coords = [(0, 1), (2, 2), (0, 1)].map(Coords::from);
        let field = Minefield::from_mine_coords(3, 4, &coords).unwrap();

        assert_eq!(field.mine_count(), 2);
        assert_eq!((field.rows(), field.cols()), (3, 4));
        assert!(field.contains_mine(Coords::new(2, 2)));
        assert!(!field.contains_mine(Coords::new(-1, 2)));
        assert_eq!(
            field.iter_mines().collect::<Vec<_>>(),
            [(0, 1), (2, 2)].map(Coords::from).to_vec()
        );
    }

    #[test]
    fn from_mine_coords_rejects_outside_positions() {
        assert_eq!(
            Minefield::from_mine_coords(3, 3, &[Coords::new(3, 0)]),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(
            Minefield::from_mine_coords(0, 3, &[]),
            Err(GameError::InvalidSize)
        );
    }

    #[test]
    fn layout_needs_a_free_patch() {
        let all = [(0, 0), (0, 1), (1, 0), (1, 1)].map(Coords::from);

        assert_eq!(
            Minefield::from_mine_coords(2, 2, &all),
            Err(GameError::TooManyMines)
        );
        assert_eq!(
            Minefield::from_mine_coords(2, 2, &all[..3]).unwrap().mine_count(),
            3
        );
        assert_eq!(
            Minefield::from_mine_mask(Array2::from_elem((1, 1), true)),
            Err(GameError::TooManyMines)
        );
    }

    #[test]
    fn deserialize_checks_layout() {
        let field = Minefield::from_mine_coords(2, 3, &[Coords::new(1, 2)]).unwrap();
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(serde_json::from_str::<Minefield>(&json).unwrap(), field);

        let miscounted = json.replace("\"count\":1", "\"count\":2");
        assert_ne!(miscounted, json);
        assert!(serde_json::from_str::<Minefield>(&miscounted).is_err());

        let full = serde_json::to_string(&Minefield::from_mask(Array2::from_elem((2, 2), true)))
            .unwrap();
        assert!(serde_json::from_str::<Minefield>(&full).is_err());

        let empty = serde_json::to_string(&Minefield::from_mask(Array2::default((0, 3)))).unwrap();
        assert!(serde_json::from_str::<Minefield>(&empty).is_err());
    }
}
