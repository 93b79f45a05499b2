//! One-ply heuristic player.
//!
//! Every legal candidate is scored with a weighted sum of local features
//! (captures, saving or creating atari, liberties, shape, eye filling) and
//! the best one is played. The same scoring orders moves for the alpha-beta
//! search.

use std::time::Instant;

use fastrand::Rng;
use tracing::debug;

use crate::board::{Board, Coord, StoneColor};
use crate::constants::{
    CAPTURE_SCORE, CENTER_BIAS_SCORE, CONNECT_OWN_SCORE, CREATE_ATARI_SCORE, CUT_OPPONENT_SCORE,
    EXPAND_LIBERTY_SCORE, FILL_EYE_PENALTY, JITTER, PASS_ORDER_BONUS, PASS_THRESHOLD, SAVE_ATARI_SCORE,
    SELF_ATARI_PENALTY,
};
use crate::game::{GameState, Move};
use crate::rules::{self, Group, Placement};
use crate::strategy::{Strategy, legal_placements, opponent_passed};

/// Distinct groups of `color` orthogonally adjacent to `at`.
fn adjacent_groups(board: &Board, at: Coord, color: StoneColor) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for n in board.neighbors(at) {
        if board.at(n) != color || groups.iter().any(|g| g.stones.contains(&n)) {
            continue;
        }
        if let Some(g) = rules::group_at(board, n) {
            groups.push(g);
        }
    }
    groups
}

/// Heuristic value of placing `color` at `at` on `board`, given the
/// already computed `placement`. Deterministic; no jitter.
pub fn evaluate_placement(board: &Board, at: Coord, color: StoneColor, placement: &Placement) -> i32 {
    let next = &placement.board;
    let opponent = color.opponent();
    let captured = placement.captured.len() as i32;
    let mut score = CAPTURE_SCORE * captured;

    let friendly = adjacent_groups(board, at, color);
    let new_liberties = rules::liberties(next, at, color);

    // Lift one of our groups out of atari.
    let saved = new_liberties >= 2 && friendly.iter().any(Group::in_atari);
    if saved {
        score += SAVE_ATARI_SCORE;
    }

    // Put an opponent group in atari.
    if next
        .neighbors(at)
        .any(|n| next.at(n) == opponent && rules::in_atari(next, n))
    {
        score += CREATE_ATARI_SCORE;
    }

    // Stand between opponent groups that could otherwise connect here.
    let opposing = adjacent_groups(board, at, opponent).len() as i32;
    if opposing >= 2 {
        score += CUT_OPPONENT_SCORE * (opposing - 1);
    }

    if let Some(before) = friendly.iter().map(Group::liberty_count).max() {
        let gain = new_liberties as i32 - before as i32;
        if gain > 0 {
            score += EXPAND_LIBERTY_SCORE * gain;
        }
    }

    let touching = board.neighbors(at).filter(|&n| board.at(n) == color).count() as i32;
    score += CONNECT_OWN_SCORE * touching;

    let center = board.size() / 2;
    let distance = at.row.abs_diff(center) + at.col.abs_diff(center);
    if distance <= center / 2 {
        score += CENTER_BIAS_SCORE;
    }

    if new_liberties == 1 && captured == 0 && !saved {
        score += SELF_ATARI_PENALTY;
    }

    if rules::is_true_eye(board, at, color) {
        score += FILL_EYE_PENALTY;
    }

    score
}

/// Ordering value of a move on `board`; passes score lower the more empty
/// points remain, and higher once the opponent has started passing.
pub fn order_score(board: &Board, mv: &Move, placement: &Placement, passes: u32) -> i32 {
    match *mv {
        Move::Place { at, color } => evaluate_placement(board, at, color, placement),
        Move::Pass(_) | Move::Resign(_) => {
            let empty = board.count(StoneColor::Empty) as i32;
            -empty + passes as i32 * PASS_ORDER_BONUS
        }
    }
}

/// Plays the highest scoring candidate, with a small random jitter.
pub struct HeuristicStrategy;

impl Strategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn select_move(&self, state: &GameState, color: StoneColor, rng: &mut Rng) -> anyhow::Result<Move> {
        let started = Instant::now();
        let board = state.board();

        let scored: Vec<(Coord, i32)> = legal_placements(board, color, state)
            .into_iter()
            .map(|(pt, placement)| {
                let score = evaluate_placement(board, pt, color, &placement)
                    + rng.i32(-JITTER..=JITTER);
                (pt, score)
            })
            .collect();

        let Some(best) = scored.iter().map(|&(_, s)| s).max() else {
            debug!(%color, "no legal candidates; passing");
            return Ok(Move::Pass(color));
        };

        if opponent_passed(state) && best < PASS_THRESHOLD {
            debug!(%color, best, "opponent passed and nothing worthwhile; passing");
            return Ok(Move::Pass(color));
        }

        let top: Vec<Coord> = scored
            .iter()
            .filter(|&&(_, s)| s == best)
            .map(|&(pt, _)| pt)
            .collect();
        let pt = top[rng.usize(..top.len())];

        debug!(
            %color,
            mv = %pt.to_vertex(board.size()),
            score = best,
            candidates = scored.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "heuristic move"
        );
        Ok(Move::place(pt, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    fn at(row: usize, col: usize) -> Coord {
        Coord::new(row, col)
    }

    fn play_all(size: usize, moves: &[Move]) -> GameState {
        let mut gs = GameState::new(&Configuration::new(size, 6.5).unwrap());
        for &mv in moves {
            gs.play(mv).unwrap();
        }
        gs
    }

    #[test]
    fn test_prefers_capture() {
        use StoneColor::{Black as B, White as W};
        let gs = play_all(
            9,
            &[
                Move::place(at(0, 1), B),
                Move::place(at(1, 1), W),
                Move::place(at(2, 1), B),
                Move::place(at(5, 5), W),
                Move::place(at(1, 0), B),
                Move::place(at(6, 6), W),
            ],
        );
        let mut rng = Rng::with_seed(1);
        let mv = HeuristicStrategy.select_move(&gs, B, &mut rng).unwrap();
        assert_eq!(mv, Move::place(at(1, 2), B));
    }

    #[test]
    fn test_escapes_atari() {
        use StoneColor::{Black as B, White as W};
        let gs = play_all(
            9,
            &[
                Move::place(at(0, 1), B),
                Move::place(at(1, 1), W),
                Move::place(at(2, 1), B),
                Move::place(at(6, 6), W),
                Move::place(at(1, 0), B),
            ],
        );
        let mut rng = Rng::with_seed(2);
        let mv = HeuristicStrategy.select_move(&gs, W, &mut rng).unwrap();
        assert_eq!(mv, Move::place(at(1, 2), W));
    }

    #[test]
    fn test_self_atari_and_eye_penalties() {
        let board: Board = "
            . X . X .
            X X X X X
            . . . . .
            . O . . .
            O . . . .
        "
        .parse()
        .unwrap();
        let eye = rules::check_move(&Move::place(at(0, 2), StoneColor::Black), &board, &rules::NoHistory)
            .unwrap();
        assert!(evaluate_placement(&board, at(0, 2), StoneColor::Black, &eye) < 0);

        // Black at (4,1) is left with one liberty and captures nothing.
        let atari = rules::check_move(&Move::place(at(4, 1), StoneColor::Black), &board, &rules::NoHistory)
            .unwrap();
        assert!(evaluate_placement(&board, at(4, 1), StoneColor::Black, &atari) < 0);
    }

    #[test]
    fn test_passes_when_only_eyes_remain() {
        use StoneColor::{Black as B, White as W};
        let stones = [
            (0, 1), (0, 3), (1, 0), (1, 1), (1, 2), (1, 3), (2, 0),
            (2, 1), (2, 3), (3, 0), (3, 1), (3, 2), (3, 3),
        ];
        let mut moves = Vec::new();
        for (r, c) in stones {
            moves.push(Move::place(at(r, c), B));
            moves.push(Move::Pass(W));
        }
        let gs = play_all(4, &moves);
        let mut rng = Rng::with_seed(3);
        let mv = HeuristicStrategy.select_move(&gs, B, &mut rng).unwrap();
        assert_eq!(mv, Move::Pass(B));
    }

    #[test]
    fn test_pass_order_score() {
        let board = Board::new(9);
        let placement = Placement {
            board: board.clone(),
            captured: vec![],
        };
        assert_eq!(order_score(&board, &Move::Pass(StoneColor::Black), &placement, 0), -81);
        assert_eq!(order_score(&board, &Move::Pass(StoneColor::Black), &placement, 1), -31);
    }
}
