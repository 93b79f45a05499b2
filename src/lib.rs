//! Go Engine: rules, game state and computer opponents for the game of Go.
//!
//! The crate decides whether a placement is legal, applies it (captures,
//! suicide, positional superko), keeps the game record with undo and clocks,
//! scores finished games by area or territory, and supplies computer players
//! of increasing strength.
//!
//! ## Modules
//!
//! - [`constants`] - Accepted board sizes, heuristic and search weights
//! - [`error`] - Error types
//! - [`board`] - Coordinates, stone colors and the board grid
//! - [`config`] - Validated game settings
//! - [`rules`] - Legality, captures, eyes and scoring
//! - [`game`] - Game state, history, undo and clocks
//! - [`strategy`] - Strategy trait, candidate generation, random play
//! - [`heuristic`] - One-ply weighted move scoring
//! - [`search`] - Alpha-beta search
//! - [`playout`] - Random game simulation for position evaluation
//! - [`montecarlo`] - Flat Monte-Carlo player
//! - [`player`] - Human and computer players, background move requests
//!
//! ## Example
//!
//! ```
//! use go_engine::board::{Coord, StoneColor};
//! use go_engine::config::Configuration;
//! use go_engine::game::{GameState, Move};
//! use go_engine::rules;
//!
//! let config = Configuration::new(9, 6.5).unwrap();
//! let mut game = GameState::new(&config);
//!
//! let mv = Move::place(Coord::new(4, 4), StoneColor::Black);
//! assert!(rules::is_legal(&mv, &game));
//! game.play(mv).unwrap();
//! assert_eq!(game.board().count(StoneColor::Black), 1);
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod heuristic;
pub mod montecarlo;
pub mod player;
pub mod playout;
pub mod rules;
pub mod search;
pub mod strategy;

pub use board::{Board, Coord, StoneColor};
pub use config::{Configuration, GameMode, ScoringRule, Strength, TimeControl};
pub use error::{GoError, IllegalMove};
pub use game::{EndReason, GameState, GameStatus, Move};
pub use player::{ComputerPlayer, HumanPlayer, MoveCallback, Player};
pub use rules::Score;
pub use strategy::Strategy;
