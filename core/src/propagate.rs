use alloc::collections::BTreeSet;
use core::cmp::Ordering;

use crate::*;

/// Pairs of neighboring patches where the first one's unexplored neighbors might be a subset
/// of the second one's.
type SupersetCandidates = BTreeSet<(Coords, Coords)>;

impl Lake {
    /// Reveal everything in `work`, then keep revealing whatever the intelligence level finds
    /// obvious, round by round, until nothing new turns up.
    ///
    /// Level 0 reveals nothing but the work-list. Level 1 opens the unexplored neighbors of an
    /// obvious patch once it is on the work-list, which covers the classic flood fill. Level 2
    /// also catches patches that became obvious through reveals around them. Level 3 adds the
    /// superset deduction of `find_supersets`.
    pub(crate) fn propagate(&mut self, mut work: BTreeSet<Coords>, changes: &mut Changes) {
        let mut round = 0;
        while !work.is_empty() {
            let mut next = BTreeSet::new();
            let mut area = BTreeSet::new();

            for &coords in &work {
                if !self.contains(coords) {
                    continue;
                }

                if self.reveal_patch(coords) {
                    changes.insert(coords);
                    area.extend(
                        self.zone(coords, 2, true)
                            .filter(|&c| self.at(c).near_unknown() > 0),
                    );
                }

                if self.intelligence() > 0 && self.at(coords).is_obvious() {
                    next.extend(self.unrevealed_neighbors(coords));
                }
            }

            if self.intelligence() > 1 {
                for &coords in &area {
                    next.extend(
                        self.zone(coords, 1, true)
                            .filter(|&c| self.at(c).is_obvious()),
                    );
                }
            }

            if self.intelligence() > 2 {
                self.find_supersets(&area, &mut next);
            }

            round += 1;
            log::trace!(
                "Propagation round {}: {} examined, {} queued, {} revealed so far",
                round,
                work.len(),
                next.len(),
                changes.len()
            );
            work = next;
        }
    }

    fn unrevealed_neighbors(&self, coords: Coords) -> impl Iterator<Item = Coords> + '_ {
        self.neighbors(coords).filter(|&c| !self.at(c).is_revealed())
    }

    /// Recognize two explored patches A and B whose sets U of unexplored neighbors satisfy
    ///
    ///  1. U(A) is a proper subset of U(B), and
    ///  2. the numbers M of hidden nearby mines satisfy either
    ///     (a) M(B) = M(A), or
    ///     (b) M(B) = |U(B)| - |U(A)|.
    ///
    /// Either way every patch in U(B) \ U(A) is queued for revealing. Margin patches and
    /// revealed mines take part like any other revealed patch.
    fn find_supersets(&self, area: &BTreeSet<Coords>, next: &mut BTreeSet<Coords>) {
        let mut candidates = SupersetCandidates::new();

        // filter out the possible cases, based purely on numbers
        for &coords in area {
            if !self.is_superset_candidate(coords) {
                continue;
            }

            let unknown = self.at(coords).near_unknown();
            for neighbor in self.neighbors(coords) {
                if !self.is_superset_candidate(neighbor) {
                    continue;
                }

                match self.at(neighbor).near_unknown().cmp(&unknown) {
                    Ordering::Greater => self.consider_pair(coords, neighbor, &mut candidates),
                    Ordering::Less => self.consider_pair(neighbor, coords, &mut candidates),
                    Ordering::Equal => {}
                }
            }
        }

        // find the real superset cases among those
        for (subset, superset) in candidates {
            debug_assert!(subset.touches(superset));

            let shared_unknown = self
                .neighbors(subset)
                .filter(|&c| c != superset && c.touches(superset))
                .filter(|&c| !self.at(c).is_revealed())
                .count();
            let subset_unknown = usize::from(self.at(subset).near_unknown());
            debug_assert!(shared_unknown <= subset_unknown);

            if shared_unknown == subset_unknown {
                next.extend(
                    self.unrevealed_neighbors(superset)
                        .filter(|&c| !c.touches(subset)),
                );
            }
        }
    }

    /// Can this patch's unexplored neighborhood take part in a superset deduction at all?
    fn is_superset_candidate(&self, coords: Coords) -> bool {
        let patch = self.at(coords);
        patch.is_revealed() && (1..=4).contains(&patch.near_unknown())
    }

    fn consider_pair(&self, subset: Coords, superset: Coords, candidates: &mut SupersetCandidates) {
        let (sub, sup) = (self.at(subset), self.at(superset));
        let area_diff = sup.near_unknown() - sub.near_unknown();
        debug_assert!(area_diff > 0);

        // neighbors on the same row or column share four neighbors, diagonal ones only two
        let common = if subset.shares_line_with(superset) { 4 } else { 2 };
        let hidden_mines_match = sup.near_hidden_mines() == sub.near_hidden_mines()
            || sup.near_hidden_mines() == area_diff;
        if sub.near_unknown() <= common && hidden_mines_match {
            candidates.insert((subset, superset));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn lake(rows: Coord, cols: Coord, mines: &[(Coord, Coord)], intelligence: Intelligence) -> Lake {
        let mines: Vec<_> = mines.iter().copied().map(Coords::from).collect();
        Lake::from_minefield(
            &Minefield::from_mine_coords(rows, cols, &mines).unwrap(),
            intelligence,
        )
    }

    fn revealed(outcome: ProbeOutcome) -> Changes {
        match outcome {
            ProbeOutcome::Revealed(changes) => changes,
            ProbeOutcome::Boom(boom) => panic!("unexpected {boom:?}"),
        }
    }

    fn coords(list: &[(Coord, Coord)]) -> Changes {
        list.iter().copied().map(Coords::from).collect()
    }

    const CORNERS: [(Coord, Coord); 4] = [(0, 0), (0, 4), (4, 0), (4, 4)];

    fn assert_all_clear_revealed(lake: &Lake) {
        for row in 0..lake.rows() {
            for col in 0..lake.cols() {
                let c = Coords::new(row, col);
                let patch = lake.patch_at(c).unwrap();
                assert!(patch.is_mined() || patch.is_revealed(), "{c} still hidden");
            }
        }
    }

    #[test]
    fn level_zero_reveals_only_the_target_patch() {
        let mut lake = lake(5, 5, &CORNERS, 0);

        let changes = revealed(lake.probe(Coords::new(2, 2), false).unwrap());

        assert_eq!(changes, coords(&[(2, 2)]));
        assert_eq!(lake.status_at(Coords::new(2, 2)), Ok(PatchStatus::Clear(0)));
        assert_eq!(lake.status_at(Coords::new(1, 2)), Ok(PatchStatus::Unrevealed));
        assert_eq!(lake.cells_remaining(), 20);
    }

    #[test]
    fn level_one_flood_fills_from_zero() {
        let mut lake = lake(5, 5, &CORNERS, 1);

        let changes = revealed(lake.probe(Coords::new(2, 2), false).unwrap());

        assert_all_clear_revealed(&lake);
        assert!(lake.is_won());
        assert_eq!(lake.moves(), 1);
        for c in [(1, 1), (0, 2), (3, 4), (4, 3)].map(Coords::from) {
            assert!(changes.contains(&c), "{c} not reported");
        }
        assert_eq!(lake.status_at(Coords::new(1, 1)), Ok(PatchStatus::Clear(1)));
        assert_eq!(lake.status_at(Coords::new(1, 2)), Ok(PatchStatus::Clear(0)));
        // nothing on the work-list ever had the corner as its last unknown
        assert_eq!(lake.status_at(Coords::new(0, 0)), Ok(PatchStatus::Unrevealed));
    }

    #[test]
    fn level_one_stops_at_numbered_patch() {
        let mut lake = lake(5, 5, &CORNERS, 1);

        let changes = revealed(lake.probe(Coords::new(1, 1), false).unwrap());

        assert_eq!(changes, coords(&[(1, 1)]));
        assert_eq!(lake.status_at(Coords::new(1, 1)), Ok(PatchStatus::Clear(1)));
    }

    #[test]
    fn level_two_revisits_patches_made_obvious() {
        let mut lake = lake(5, 5, &CORNERS, 2);

        let changes = revealed(lake.probe(Coords::new(2, 2), false).unwrap());

        assert!(lake.is_won());
        for corner in CORNERS.map(Coords::from) {
            assert_eq!(lake.status_at(corner), Ok(PatchStatus::Mine), "{corner}");
            assert!(changes.contains(&corner));
        }
        assert_eq!(lake.cells_remaining(), 0);
    }

    #[test]
    fn level_two_misses_superset() {
        let mut lake = lake(2, 4, &[(0, 1), (0, 3)], 2);

        lake.probe(Coords::new(1, 0), false).unwrap();
        let changes = revealed(lake.probe(Coords::new(1, 1), false).unwrap());

        assert_eq!(changes, coords(&[(1, 1)]));
        assert_eq!(lake.cells_remaining(), 4);
    }

    /// Interior lake with `opened` revealed one by one at level 0.
    fn opened(mines: &[(Coord, Coord)], opened: &[(Coord, Coord)]) -> Lake {
        let mut lake = lake(10, 10, mines, 0);
        for &c in opened {
            revealed(lake.probe(Coords::from(c), false).unwrap());
        }
        lake
    }

    fn supersets_around(lake: &Lake, area: &[(Coord, Coord)]) -> Changes {
        let mut next = BTreeSet::new();
        lake.find_supersets(&coords(area), &mut next);
        next
    }

    // (5,3) has (4,3) and (4,4) left unexplored, (5,4) has those plus (4,5) and (5,5)
    const AROUND_PAIR: [(Coord, Coord); 8] = [
        (4, 2),
        (5, 2),
        (6, 2),
        (6, 3),
        (6, 4),
        (6, 5),
        (5, 3),
        (5, 4),
    ];

    #[test]
    fn superset_with_equal_hidden_mines() {
        let lake = opened(&[(4, 3)], &AROUND_PAIR);
        assert_eq!(lake.at(Coords::new(5, 3)).near_hidden_mines(), 1);
        assert_eq!(lake.at(Coords::new(5, 4)).near_hidden_mines(), 1);

        assert_eq!(supersets_around(&lake, &[(5, 3)]), coords(&[(4, 5), (5, 5)]));
    }

    #[test]
    fn superset_with_hidden_mines_equal_to_area_difference() {
        let lake = opened(&[(4, 3), (4, 5)], &AROUND_PAIR);
        let (sub, sup) = (lake.at(Coords::new(5, 3)), lake.at(Coords::new(5, 4)));
        assert_eq!((sub.near_unknown(), sub.near_hidden_mines()), (2, 1));
        assert_eq!((sup.near_unknown(), sup.near_hidden_mines()), (4, 2));

        assert_eq!(supersets_around(&lake, &[(5, 3)]), coords(&[(4, 5), (5, 5)]));
    }

    #[test]
    fn superset_needs_every_subset_unknown_in_common() {
        // (5,2) passes the count filter against (5,3), but only shares (4,3) with it
        let lake = opened(&[(4, 3)], &AROUND_PAIR[..5]);
        let mut candidates = SupersetCandidates::new();
        lake.consider_pair(Coords::new(5, 3), Coords::new(5, 2), &mut candidates);
        assert_eq!(candidates.len(), 1);

        assert_eq!(supersets_around(&lake, &[(5, 3)]), Changes::new());
    }

    #[test]
    fn margin_patch_takes_part_in_supersets() {
        let mut lake = lake(2, 3, &[(0, 1)], 0);
        revealed(lake.probe(Coords::new(0, 0), false).unwrap());
        let margin = lake.at(Coords::new(-1, 0));
        assert_eq!((margin.near_unknown(), margin.near_hidden_mines()), (1, 1));

        assert_eq!(
            supersets_around(&lake, &[(-1, 0)]),
            coords(&[(0, 2), (1, 0), (1, 1)])
        );
    }

    #[test]
    fn level_three_solves_small_lake_from_margin() {
        let mut lake = lake(2, 3, &[(0, 1)], 3);

        let changes = revealed(lake.probe(Coords::new(0, 0), false).unwrap());

        assert_eq!(changes.len(), 6);
        assert!(lake.is_won());
        assert_eq!(lake.status_at(Coords::new(0, 1)), Ok(PatchStatus::Mine));
        assert_eq!(lake.status_at(Coords::new(1, 2)), Ok(PatchStatus::Clear(1)));
    }

    #[test]
    fn intelligence_can_change_mid_game() {
        let mut lake = lake(5, 5, &CORNERS, 0);
        revealed(lake.probe(Coords::new(0, 2), false).unwrap());
        assert_eq!(lake.cells_remaining(), 20);

        lake.set_intelligence(MAX_INTELLIGENCE + 5);
        revealed(lake.probe(Coords::new(2, 2), false).unwrap());

        assert!(lake.is_won());
    }
}
