//! Error types.

use thiserror::Error;

/// Why a move was rejected. Always recoverable: the board is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    /// Point is not empty
    #[error("point is not empty")]
    Occupied,
    /// Point is outside the board
    #[error("point is off the board")]
    OffBoard,
    /// Placement would leave its own group without liberties
    #[error("suicide")]
    Suicide,
    /// Placement recreates an earlier board position
    #[error("repeats a previous position (superko)")]
    Superko,
    /// Move was made by the player who is not to move
    #[error("not this player's turn")]
    WrongTurn,
}

/// Errors surfaced by the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GoError {
    /// A configuration value is outside its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A coordinate escaped validation.
    #[error("coordinate ({row}, {col}) is outside a {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },

    /// The move breaks the rules.
    #[error("illegal move: {0}")]
    Illegal(#[from] IllegalMove),

    /// The game has already ended.
    #[error("game is already finished")]
    GameFinished,

    /// A computer player was asked for a move while still computing one.
    #[error("a move computation is already in flight")]
    MovePending,
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, GoError>;
