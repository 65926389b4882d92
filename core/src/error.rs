use alloc::string::String;
use thiserror::Error;

use crate::Coord;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid lake dimensions")]
    InvalidSize,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Saved game format error: {0}")]
    Format(#[from] FormatError),
}

/// Reasons a snapshot can be rejected by [`crate::Lake::restore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("saved game not in recognized format")]
    UnrecognizedHeader,
    #[error("unexpected end of saved-game buffer")]
    UnexpectedEnd,
    #[error("no {key} field (found '{found}' instead)")]
    MissingField { key: &'static str, found: String },
    #[error("invalid value '{value}' for {key} field")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid dimensions {rows}x{cols}")]
    InvalidDimensions { rows: Coord, cols: Coord },
    #[error("unexpected character in data block: '{0}'")]
    UnexpectedChar(char),
    #[error("incorrect end of data line")]
    BadPadding,
    #[error("truncated data")]
    Truncated,
    #[error("unexpected data after end of data block")]
    TrailingData,
    #[error("data for patches beyond the last column on row {row}")]
    StrayBits { row: Coord },
}

pub type Result<T> = core::result::Result<T, GameError>;
