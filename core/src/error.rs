use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Construction parameters can never produce a playable board.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("Coordinates {0:?} are out of bounds")]
    OutOfBounds(Coord2),
}

pub type Result<T> = core::result::Result<T, GameError>;
