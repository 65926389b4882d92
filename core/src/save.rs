//! Saved games, encoded in a home-rolled base64 (see RFC 3548) with 6 bits of data per
//! character.
//!
//! A snapshot is a version header, four integer fields and one data line per row. Each data
//! character packs three patches of two bits each, mined and revealed, with the leftmost
//! patch in the lowest bits.

use alloc::string::{String, ToString};
use core::fmt::{self, Write};
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::*;

/// Header at start of saved game, names the format version.
const SAVE_HEADER: &str = "#mines 0.2\n";

const PATCHES_PER_CHAR: Coord = 3;
const MINED_BIT: u8 = 0b10;
const REVEALED_BIT: u8 = 0b01;

const ENCODE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const INVALID: u8 = u8::MAX;
static DECODE: [u8; 256] = decode_table();

const fn decode_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ENCODE.len() {
        table[ENCODE[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const PADDING: &str = "==";

fn chars_per_row(cols: Coord) -> usize {
    (cols as usize).div_ceil(PATCHES_PER_CHAR as usize)
}

/// End-of-line padding, in bytes, for a row of `cols` patches.
pub fn line_padding(cols: Coord) -> usize {
    (cols as usize).div_ceil(8) % 3
}

/// Upper bound on the snapshot length of a `rows` by `cols` lake.
pub fn save_size(rows: Coord, cols: Coord) -> usize {
    rows as usize * (chars_per_row(cols) + 3) + 100
}

impl Lake {
    /// Maximum number of bytes required to save this game.
    pub fn save_size(&self) -> usize {
        save_size(self.rows(), self.cols())
    }

    /// Encode the full game state.
    pub fn save(&self) -> String {
        self.snapshot().to_string()
    }

    /// Display adapter producing the same text as [`Lake::save`].
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot(self)
    }

    /// Write the snapshot into a caller-provided buffer, see [`Lake::save_size`].
    pub fn write_snapshot<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str(SAVE_HEADER)?;
        writeln!(out, "rows {}", self.rows())?;
        writeln!(out, "cols {}", self.cols())?;
        writeln!(out, "move {}", self.moves())?;
        writeln!(out, "intl {}", self.intelligence())?;
        out.write_char('\n')?;

        let padding = &PADDING[..line_padding(self.cols())];
        for row in 0..self.rows() {
            for first in (0..self.cols()).step_by(PATCHES_PER_CHAR as usize) {
                let mut bits = 0;
                for col in (first..first + PATCHES_PER_CHAR).rev() {
                    bits <<= 2;
                    if col < self.cols() {
                        let patch = self.at(Coords::new(row, col));
                        if patch.is_mined() {
                            bits |= MINED_BIT;
                        }
                        if patch.is_revealed() {
                            bits |= REVEALED_BIT;
                        }
                    }
                }
                out.write_char(ENCODE[usize::from(bits)] as char)?;
            }
            out.write_str(padding)?;
            out.write_char('\n')?;
        }
        Ok(())
    }

    /// Start a game from saved state.
    ///
    /// Mines and revealed patches are replayed in row-major order, so all neighbor counters
    /// come out the same as in the lake that was saved.
    pub fn restore(snapshot: &str) -> Result<Self> {
        let mut reader = SnapshotReader::new(snapshot);
        reader.header()?;
        let rows: Coord = reader.field("rows")?;
        let cols: Coord = reader.field("cols")?;
        let moves: CellCount = reader.field("move")?;
        let intelligence: Intelligence = reader.field("intl")?;

        if checked_area(rows, cols).is_err() {
            return Err(FormatError::InvalidDimensions { rows, cols }.into());
        }

        let padding = line_padding(cols);
        reader.skip_whitespace();
        // don't allocate for more rows than the buffer could possibly hold
        reader.expect_lines(rows as usize, chars_per_row(cols) + padding + 1)?;

        let mut lake = Lake::empty(rows, cols, intelligence, moves);
        for row in 0..rows {
            for first in (0..cols).step_by(PATCHES_PER_CHAR as usize) {
                let mut bits = reader.data_char()?;
                for col in first..first + PATCHES_PER_CHAR {
                    if col >= cols {
                        if bits != 0 {
                            return Err(FormatError::StrayBits { row }.into());
                        }
                        break;
                    }
                    let coords = Coords::new(row, col);
                    if bits & MINED_BIT != 0 {
                        lake.place_mine_at(coords);
                    }
                    if bits & REVEALED_BIT != 0 {
                        lake.reveal_patch(coords);
                    }
                    bits >>= 2;
                }
            }
            reader.end_of_line(padding)?;
        }
        reader.finish()?;

        log::debug!(
            "Restored {}x{} lake after {} moves, {} patches to go",
            rows,
            cols,
            moves,
            lake.cells_remaining()
        );
        Ok(lake)
    }
}

impl FromStr for Lake {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::restore(s)
    }
}

/// A lake rendered in its saved-game format.
#[derive(Copy, Clone, Debug)]
pub struct Snapshot<'a>(&'a Lake);

impl fmt::Display for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_snapshot(f)
    }
}

impl Serialize for Lake {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.snapshot())
    }
}

impl<'de> Deserialize<'de> for Lake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let snapshot = String::deserialize(deserializer)?;
        Lake::restore(&snapshot).map_err(serde::de::Error::custom)
    }
}

struct SnapshotReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> SnapshotReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn rest(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.rest().first().copied()
    }

    fn header(&mut self) -> core::result::Result<(), FormatError> {
        if !self.rest().starts_with(SAVE_HEADER.as_bytes()) {
            return Err(FormatError::UnrecognizedHeader);
        }
        self.pos += SAVE_HEADER.len();
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn token(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(|c| !c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Read a `key value` line, `key` being exactly four characters.
    fn field<T: FromStr>(&mut self, key: &'static str) -> core::result::Result<T, FormatError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(FormatError::UnexpectedEnd);
        }
        if !self.rest().starts_with(key.as_bytes()) {
            let found = self.rest().iter().take(key.len()).map(|&c| c as char).collect();
            return Err(FormatError::MissingField { key, found });
        }
        self.pos += key.len();
        self.skip_whitespace();

        let value = self.token();
        core::str::from_utf8(value)
            .ok()
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| FormatError::InvalidValue {
                key,
                value: String::from_utf8_lossy(value).into_owned(),
            })
    }

    fn expect_lines(&self, lines: usize, line_len: usize) -> core::result::Result<(), FormatError> {
        match lines.checked_mul(line_len) {
            Some(needed) if needed <= self.rest().len() => Ok(()),
            _ => Err(FormatError::Truncated),
        }
    }

    /// Extract a character's worth of encoded data.
    fn data_char(&mut self) -> core::result::Result<u8, FormatError> {
        let c = self.peek().ok_or(FormatError::Truncated)?;
        let bits = DECODE[usize::from(c)];
        if bits == INVALID {
            return Err(FormatError::UnexpectedChar(char::from(c)));
        }
        self.pos += 1;
        Ok(bits)
    }

    /// Padding, then at least one whitespace character.
    fn end_of_line(&mut self, padding: usize) -> core::result::Result<(), FormatError> {
        if !self.rest().starts_with(&PADDING.as_bytes()[..padding]) {
            return Err(FormatError::BadPadding);
        }
        self.pos += padding;

        match self.peek() {
            None => return Err(FormatError::Truncated),
            Some(c) if !c.is_ascii_whitespace() => {
                return Err(FormatError::UnexpectedChar(char::from(c)));
            }
            Some(_) => {}
        }
        self.skip_whitespace();
        Ok(())
    }

    fn finish(&mut self) -> core::result::Result<(), FormatError> {
        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(FormatError::TrailingData);
        }
        Ok(())
    }
}
