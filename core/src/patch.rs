use core::fmt;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// Player-visible state of a patch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchStatus {
    Unrevealed,
    Mine,
    Clear(#[serde(deserialize_with = "nearby_mine_count")] u8),
}

fn nearby_mine_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let count = u8::deserialize(deserializer)?;
    if count > 8 {
        return Err(de::Error::invalid_value(
            Unexpected::Unsigned(count.into()),
            &"at most 8 nearby mines",
        ));
    }
    Ok(count)
}

impl PatchStatus {
    /// `'^'` for unexplored water, `'*'` for a known mine, or the digit counting nearby mines.
    pub const fn to_char(self) -> char {
        match self {
            Self::Unrevealed => '^',
            Self::Mine => '*',
            Self::Clear(count) => (b'0' + if count > 8 { 8 } else { count }) as char,
        }
    }

    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Unrevealed)
    }
}

impl fmt::Display for PatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A square patch of water, which may or may not contain a mine.
///
/// Besides its own state a patch tracks how many of its neighbors are still unexplored, and
/// how many of those are mined. Border patches keep counting neighbors they don't have, so
/// `near_unknown` is only exact inside the field and its first two margin rings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    near_mines: u8,
    near_hidden_mines: u8,
    near_unknown: u8,
    mined: bool,
    revealed: bool,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            near_mines: 0,
            near_hidden_mines: 0,
            near_unknown: 8,
            mined: false,
            revealed: false,
        }
    }
}

impl Patch {
    pub const fn is_mined(&self) -> bool {
        self.mined
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn near_mines(&self) -> u8 {
        self.near_mines
    }

    pub const fn near_hidden_mines(&self) -> u8 {
        self.near_hidden_mines
    }

    pub const fn near_unknown(&self) -> u8 {
        self.near_unknown
    }

    /// Whether the state of every unrevealed neighbor follows from this patch's counts alone.
    pub const fn is_obvious(&self) -> bool {
        self.near_unknown > 0
            && self.revealed
            && !self.mined
            && (self.near_hidden_mines == 0 || self.near_hidden_mines == self.near_unknown)
    }

    pub const fn status(&self) -> PatchStatus {
        match (self.revealed, self.mined) {
            (false, _) => PatchStatus::Unrevealed,
            (true, true) => PatchStatus::Mine,
            (true, false) => PatchStatus::Clear(self.near_mines),
        }
    }

    pub(crate) fn mine(&mut self) {
        debug_assert!(!self.mined);
        self.mined = true;
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
    }

    /// A neighbor has just been mined.
    pub(crate) fn set_nearby_mine(&mut self) {
        self.near_mines += 1;
        self.near_hidden_mines += 1;
        debug_assert!(self.near_mines <= 8);
        debug_assert!(self.near_hidden_mines <= self.near_mines);
    }

    /// A neighbor has just been revealed.
    pub(crate) fn reveal_nearby(&mut self, is_mined: bool) {
        if is_mined {
            self.near_hidden_mines -= 1;
        }
        self.near_unknown -= 1;
        debug_assert!(self.near_hidden_mines <= self.near_unknown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_chars() {
        assert_eq!(PatchStatus::Unrevealed.to_char(), '^');
        assert_eq!(PatchStatus::Mine.to_char(), '*');
        assert_eq!(PatchStatus::Clear(0).to_char(), '0');
        assert_eq!(PatchStatus::Clear(8).to_char(), '8');
    }

    #[test]
    fn obvious_when_all_hidden_neighbors_are_safe_or_all_mined() {
        let mut patch = Patch::default();
        patch.set_nearby_mine();
        patch.reveal();
        assert!(!patch.is_obvious());

        for _ in 0..6 {
            patch.reveal_nearby(false);
        }
        // one mine among two unknowns
        assert!(!patch.is_obvious());

        patch.reveal_nearby(false);
        assert_eq!(patch.near_unknown(), 1);
        assert!(patch.is_obvious());

        patch.reveal_nearby(true);
        assert_eq!(patch.near_hidden_mines(), 0);
        assert_eq!(patch.near_mines(), 1);
        assert!(!patch.is_obvious());
    }

    #[test]
    fn clear_count_is_bounded() {
        assert_eq!(PatchStatus::Clear(200).to_char(), '8');

        let status: PatchStatus = serde_json::from_str(r#"{"Clear":3}"#).unwrap();
        assert_eq!(status, PatchStatus::Clear(3));
        assert!(serde_json::from_str::<PatchStatus>(r#"{"Clear":9}"#).is_err());
    }

    #[test]
    fn hidden_patch_is_never_obvious() {
        let patch = Patch::default();

        assert!(!patch.is_obvious());
        assert_eq!(patch.status(), PatchStatus::Unrevealed);
    }
}
