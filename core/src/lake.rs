use alloc::collections::BTreeSet;
use ndarray::Array2;

use crate::*;

/// The "minefield." This is where it all happens.
///
/// A lake is a rectangle of square [`Patch`]es, each of which may or may not have a mine in it.
/// Internally the lake is surrounded by [`BORDER`] rings of revealed, clear patches, so
/// neighbor bookkeeping needs no special cases along the edges. Those margin patches may be
/// queried like any other, but only positions inside `[0, rows) x [0, cols)` count towards
/// the game.
#[derive(Clone, Debug, PartialEq)]
pub struct Lake {
    patches: Array2<Patch>,
    rows: Coord,
    cols: Coord,
    intelligence: Intelligence,
    patches_to_go: CellCount,
    moves: CellCount,
}

impl Lake {
    /// Start a new game with a randomly placed minefield.
    pub fn new(config: LakeConfig) -> Self {
        Self::with_generator(config, RandomMinefieldGenerator::from_entropy())
    }

    pub fn with_generator(config: LakeConfig, generator: impl MinefieldGenerator) -> Self {
        Self::from_minefield(&generator.generate(&config), config.intelligence())
    }

    pub fn from_minefield(minefield: &Minefield, intelligence: Intelligence) -> Self {
        let mut lake = Self::empty(minefield.rows(), minefield.cols(), intelligence, 0);
        for coords in minefield.iter_mines() {
            lake.place_mine_at(coords);
        }
        lake
    }

    /// Unmined field with the margin already revealed. Sides must have passed [`checked_area`].
    pub(crate) fn empty(
        rows: Coord,
        cols: Coord,
        intelligence: Intelligence,
        moves: CellCount,
    ) -> Self {
        let extent = Coords::new(rows + BORDER, cols + BORDER).to_nd_index(BORDER);
        let mut lake = Self {
            patches: Array2::default(extent),
            rows,
            cols,
            intelligence,
            patches_to_go: rows as CellCount * cols as CellCount,
            moves,
        };
        lake.init_border();
        lake
    }

    /// Reveal the margin ring by ring, innermost first.
    fn init_border(&mut self) {
        for ring in 1..=BORDER {
            let (top, bottom) = (-ring, self.rows + ring - 1);
            let (left, right) = (-ring, self.cols + ring - 1);
            for col in left..=right {
                self.reveal_patch(Coords::new(top, col));
                self.reveal_patch(Coords::new(bottom, col));
            }
            for row in top + 1..bottom {
                self.reveal_patch(Coords::new(row, left));
                self.reveal_patch(Coords::new(row, right));
            }
        }
    }

    pub fn rows(&self) -> Coord {
        self.rows
    }

    pub fn cols(&self) -> Coord {
        self.cols
    }

    /// Number of probes made so far, including a fatal one.
    pub fn moves(&self) -> CellCount {
        self.moves
    }

    /// Number of unmined patches still to be revealed.
    pub fn cells_remaining(&self) -> CellCount {
        self.patches_to_go
    }

    pub fn is_won(&self) -> bool {
        self.patches_to_go == 0
    }

    pub fn intelligence(&self) -> Intelligence {
        self.intelligence
    }

    /// Change how much gets revealed automatically after each probe.
    pub fn set_intelligence(&mut self, intelligence: Intelligence) {
        self.intelligence = intelligence;
    }

    /// Whether `coords` lies in the playing field proper.
    pub fn contains(&self, coords: Coords) -> bool {
        (0..self.rows).contains(&coords.row) && (0..self.cols).contains(&coords.col)
    }

    /// Whether `coords` may be queried, the border margin included.
    pub fn is_queryable(&self, coords: Coords) -> bool {
        (-BORDER..self.rows + BORDER).contains(&coords.row)
            && (-BORDER..self.cols + BORDER).contains(&coords.col)
    }

    pub fn validate_coords(&self, coords: Coords) -> Result<Coords> {
        if self.is_queryable(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn patch_at(&self, coords: Coords) -> Result<&Patch> {
        let coords = self.validate_coords(coords)?;
        Ok(self.at(coords))
    }

    /// Status of the patch at `coords`, which may lie in the border margin.
    pub fn status_at(&self, coords: Coords) -> Result<PatchStatus> {
        self.patch_at(coords).map(Patch::status)
    }

    /// Mark the patch at `coords` as either clear or mined.
    ///
    /// Probing a revealed patch changes nothing, not even the move count. A claim that doesn't
    /// match the patch reveals just that patch and ends in [`ProbeOutcome::Boom`]; the caller
    /// is responsible for ending the game. Otherwise the patch is revealed along with whatever
    /// the current intelligence level finds obvious.
    pub fn probe(&mut self, coords: Coords, as_mine: bool) -> Result<ProbeOutcome> {
        let patch = *self.patch_at(coords)?;
        if patch.is_revealed() {
            return Ok(ProbeOutcome::Revealed(Changes::new()));
        }

        self.moves += 1;
        if patch.is_mined() != as_mine {
            self.reveal_patch(coords);
            log::debug!("Boom at {} after {} moves", coords, self.moves);
            return Ok(ProbeOutcome::Boom(Boom {
                position: coords,
                moves: self.moves,
                mined: patch.is_mined(),
            }));
        }

        let mut changes = Changes::new();
        self.propagate(BTreeSet::from([coords]), &mut changes);
        Ok(ProbeOutcome::Revealed(changes))
    }

    pub(crate) fn at(&self, coords: Coords) -> &Patch {
        debug_assert!(self.is_queryable(coords));
        &self.patches[coords.to_nd_index(BORDER)]
    }

    fn at_mut(&mut self, coords: Coords) -> &mut Patch {
        debug_assert!(self.is_queryable(coords));
        &mut self.patches[coords.to_nd_index(BORDER)]
    }

    /// Square of queryable positions within `radius` of `center`.
    pub(crate) fn zone(&self, center: Coords, radius: Coord, include_center: bool) -> ZoneIter {
        ZoneIter::new(
            center,
            radius,
            include_center,
            Coords::new(-BORDER, -BORDER),
            Coords::new(self.rows + BORDER, self.cols + BORDER),
        )
    }

    pub(crate) fn neighbors(&self, center: Coords) -> ZoneIter {
        self.zone(center, 1, false)
    }

    /// Returns whether a mine was actually added.
    pub(crate) fn place_mine_at(&mut self, coords: Coords) -> bool {
        let patch = self.at_mut(coords);
        if patch.is_mined() {
            return false;
        }

        patch.mine();
        self.patches_to_go -= 1;
        for neighbor in self.neighbors(coords) {
            self.at_mut(neighbor).set_nearby_mine();
        }
        true
    }

    /// Returns whether the patch was newly revealed.
    pub(crate) fn reveal_patch(&mut self, coords: Coords) -> bool {
        let patch = self.at_mut(coords);
        if patch.is_revealed() {
            return false;
        }

        patch.reveal();
        let mined = patch.is_mined();
        for neighbor in self.neighbors(coords) {
            self.at_mut(neighbor).reveal_nearby(mined);
        }
        if !mined && self.contains(coords) {
            self.patches_to_go -= 1;
        }
        true
    }
}
