//! Flat Monte-Carlo player: random playouts over the best heuristic moves.

use std::cmp::Reverse;
use std::time::Instant;

use fastrand::Rng;
use tracing::debug;

use crate::board::{Coord, StoneColor};
use crate::constants::{MONTE_CARLO_CANDIDATES, PASS_THRESHOLD};
use crate::game::{GameState, Move};
use crate::heuristic::evaluate_placement;
use crate::playout::mcplayout;
use crate::strategy::{Strategy, legal_placements, opponent_passed};

/// Plays the candidate whose playouts win most often.
pub struct MonteCarloStrategy {
    playouts: usize,
    candidates: usize,
}

impl MonteCarloStrategy {
    pub fn new(playouts: usize) -> Self {
        Self {
            playouts: playouts.max(1),
            candidates: MONTE_CARLO_CANDIDATES,
        }
    }

    pub fn with_candidates(mut self, candidates: usize) -> Self {
        self.candidates = candidates.max(1);
        self
    }
}

impl Strategy for MonteCarloStrategy {
    fn name(&self) -> &'static str {
        "monte-carlo"
    }

    fn select_move(&self, state: &GameState, color: StoneColor, rng: &mut Rng) -> anyhow::Result<Move> {
        let started = Instant::now();
        let board = state.board();

        let mut ranked: Vec<_> = legal_placements(board, color, state)
            .into_iter()
            .map(|(pt, placement)| {
                let score = evaluate_placement(board, pt, color, &placement);
                (pt, placement, score)
            })
            .collect();
        ranked.sort_by_key(|&(_, _, score)| Reverse(score));
        ranked.truncate(self.candidates);

        let Some(top_score) = ranked.first().map(|&(_, _, s)| s) else {
            debug!(%color, "no legal candidates; passing");
            return Ok(Move::Pass(color));
        };
        if opponent_passed(state) && top_score < PASS_THRESHOLD {
            debug!(%color, top_score, "opponent passed and nothing worthwhile; passing");
            return Ok(Move::Pass(color));
        }

        let mut best_wins = 0;
        let mut best: Vec<Coord> = Vec::new();
        for (pt, placement, _) in &ranked {
            let wins = (0..self.playouts)
                .filter(|_| mcplayout(&placement.board, color.opponent(), color, state.komi(), rng) > 0.0)
                .count();
            if wins > best_wins || best.is_empty() {
                best_wins = wins;
                best.clear();
            }
            if wins == best_wins {
                best.push(*pt);
            }
        }

        let pt = best[rng.usize(..best.len())];
        debug!(
            %color,
            mv = %pt.to_vertex(board.size()),
            win_rate = best_wins as f64 / self.playouts as f64,
            candidates = ranked.len(),
            playouts = self.playouts,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "monte-carlo move"
        );
        Ok(Move::place(pt, color))
    }
}
