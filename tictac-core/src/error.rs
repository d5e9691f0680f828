//! Error types for the game engine

use thiserror::Error;

/// A move the rules do not allow. Always recoverable: the rejected call
/// leaves the board and session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("cell {index} is outside the board (expected 0..9)")]
    OutOfRange { index: usize },
    #[error("cell {index} is already occupied")]
    Occupied { index: usize },
    #[error("it is not this side's turn to move")]
    WrongTurn,
    #[error("the game is already over")]
    GameOver,
}

/// Failure to parse a board from its text form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardParseError {
    #[error("expected 9 cells, found {0}")]
    WrongLength(usize),
    #[error("unexpected character {0:?} in board")]
    InvalidCell(char),
    #[error("mark counts are not reachable by alternating play (X={x}, O={o})")]
    Unbalanced { x: usize, o: usize },
}
