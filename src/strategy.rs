//! Computer move selection: the [`Strategy`] trait, shared candidate
//! generation and the random strategy.
//!
//! Checking every empty point for legality on a 19x19 board each turn is the
//! dominant cost, so all strategies only look at empty points near existing
//! stones (plus the center and star points on an empty board). A legal move
//! far away from every stone can be missed; such moves are never good ones.

use std::collections::BTreeSet;
use std::sync::Arc;

use fastrand::Rng;
use tracing::debug;

use crate::board::{Board, Coord, StoneColor};
use crate::config::Strength;
use crate::constants::{
    CANDIDATE_RADIUS_LARGE, CANDIDATE_RADIUS_SMALL, DEFAULT_PLAYOUTS, DEFAULT_SEARCH_DEPTH,
    LARGE_BOARD_CANDIDATES, LARGE_BOARD_PLAYOUTS, LARGE_BOARD_SEARCH_BREADTH, MAX_SEARCH_BREADTH,
    MONTE_CARLO_CANDIDATES, SMALL_BOARD_MAX, STAR_POINT_LINE,
};
use crate::game::{GameState, Move};
use crate::heuristic::HeuristicStrategy;
use crate::montecarlo::MonteCarloStrategy;
use crate::rules::{self, Placement, PositionHistory};
use crate::search::AlphaBetaStrategy;

/// A way of choosing a move for `color` in a position.
///
/// Implementations are stateless between calls so that one instance can be
/// shared with a background worker; randomness comes from `rng`.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Choose a move. Errors are turned into a pass by the caller.
    fn select_move(&self, state: &GameState, color: StoneColor, rng: &mut Rng) -> anyhow::Result<Move>;
}

/// Build the strategy that plays at `strength` on a `board_size` board.
///
/// Boards above 9x9 get a narrower search and fewer playouts.
pub fn for_strength(strength: Strength, board_size: usize) -> Arc<dyn Strategy> {
    let small = board_size <= SMALL_BOARD_MAX;
    match strength {
        Strength::Beginner => Arc::new(RandomStrategy),
        Strength::Easy => Arc::new(HeuristicStrategy),
        Strength::Medium => {
            let breadth = if small { MAX_SEARCH_BREADTH } else { LARGE_BOARD_SEARCH_BREADTH };
            Arc::new(AlphaBetaStrategy::new(DEFAULT_SEARCH_DEPTH).with_breadth(breadth))
        }
        Strength::Hard => {
            let (playouts, candidates) = if small {
                (DEFAULT_PLAYOUTS, MONTE_CARLO_CANDIDATES)
            } else {
                (LARGE_BOARD_PLAYOUTS, LARGE_BOARD_CANDIDATES)
            };
            Arc::new(MonteCarloStrategy::new(playouts).with_candidates(candidates))
        }
    }
}

/// Radius around stones inside which empty points are considered.
pub fn candidate_radius(size: usize) -> usize {
    if size <= SMALL_BOARD_MAX {
        CANDIDATE_RADIUS_SMALL
    } else {
        CANDIDATE_RADIUS_LARGE
    }
}

/// Empty points worth considering, in row-major order.
///
/// Points within [`candidate_radius`] of any stone; on an empty board the
/// center and the four star points.
pub fn candidate_points(board: &Board) -> Vec<Coord> {
    let size = board.size();
    let radius = candidate_radius(size) as isize;
    let mut candidates = BTreeSet::new();

    for pt in board.points() {
        if !board.at(pt).is_stone() {
            continue;
        }
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                if let Some(n) = pt.offset(dr, dc, size) {
                    if !board.at(n).is_stone() {
                        candidates.insert(n);
                    }
                }
            }
        }
    }

    if candidates.is_empty() {
        candidates.insert(board.center());
        if size > 2 * STAR_POINT_LINE {
            let far = size - 1 - STAR_POINT_LINE;
            for (r, c) in [
                (STAR_POINT_LINE, STAR_POINT_LINE),
                (STAR_POINT_LINE, far),
                (far, STAR_POINT_LINE),
                (far, far),
            ] {
                candidates.insert(Coord::new(r, c));
            }
        }
        candidates.retain(|&pt| !board.at(pt).is_stone());
    }

    candidates.into_iter().collect()
}

/// Legal placements for `color` among the candidate points.
pub fn legal_placements<H>(board: &Board, color: StoneColor, history: &H) -> Vec<(Coord, Placement)>
where
    H: PositionHistory + ?Sized,
{
    candidate_points(board)
        .into_iter()
        .filter_map(|pt| {
            rules::check_move(&Move::place(pt, color), board, history)
                .ok()
                .map(|placement| (pt, placement))
        })
        .collect()
}

/// Whether the most recent move was a pass.
pub fn opponent_passed(state: &GameState) -> bool {
    state.last_move().is_some_and(Move::is_pass)
}

/// Uniformly random legal candidate; passes when there is none.
pub struct RandomStrategy;

impl Strategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select_move(&self, state: &GameState, color: StoneColor, rng: &mut Rng) -> anyhow::Result<Move> {
        let legal = legal_placements(state.board(), color, state);
        if legal.is_empty() {
            debug!(%color, "no legal candidates; passing");
            return Ok(Move::Pass(color));
        }
        let pt = legal[rng.usize(..legal.len())].0;
        Ok(Move::place(pt, color))
    }
}
