//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays random legal moves that do not fill the mover's own true
//! eyes until both sides pass in a row or the length limit is hit, then
//! scores the final board by area. Positional superko is not tracked inside
//! a playout; only suicide is ruled out.

use fastrand::Rng;

use crate::board::{Board, Coord, StoneColor};
use crate::config::ScoringRule;
use crate::constants::PLAYOUT_LENGTH_FACTOR;
use crate::game::Move;
use crate::rules::{self, NoHistory, Placement};

/// Perform a playout from `board` with `to_move` playing first.
///
/// Returns the area score margin from `perspective`'s point of view:
/// positive means `perspective` wins.
pub fn mcplayout(board: &Board, to_move: StoneColor, perspective: StoneColor, komi: f32, rng: &mut Rng) -> f32 {
    let size = board.size();
    let limit = PLAYOUT_LENGTH_FACTOR * size * size;
    let mut board = board.clone();
    let mut color = to_move;
    let mut passes = 0;
    let mut moves = 0;

    while passes < 2 && moves < limit {
        match choose_random_move(&board, color, rng) {
            Some((_, placement)) => {
                board = placement.board;
                passes = 0;
            }
            None => passes += 1,
        }
        color = color.opponent();
        moves += 1;
    }

    margin(&board, perspective, komi)
}

/// Choose a random legal move for `color` that is not one of its true eyes.
pub fn choose_random_move(board: &Board, color: StoneColor, rng: &mut Rng) -> Option<(Coord, Placement)> {
    let mut candidates: Vec<Coord> = board
        .points()
        .filter(|&pt| !board.at(pt).is_stone() && !rules::is_true_eye(board, pt, color))
        .collect();

    // Shuffle lazily and stop at the first legal one; some candidates are suicide.
    let n = candidates.len();
    for i in 0..n {
        let j = i + rng.usize(..n - i);
        candidates.swap(i, j);

        let pt = candidates[i];
        if let Ok(placement) = rules::check_move(&Move::place(pt, color), board, &NoHistory) {
            return Some((pt, placement));
        }
    }
    None
}

/// Area score margin of `board` for `color`, komi going to White.
pub fn margin(board: &Board, color: StoneColor, komi: f32) -> f32 {
    let score = rules::score_board(board, ScoringRule::Area, [0, 0], komi);
    score.of(color) - score.of(color.opponent())
}
