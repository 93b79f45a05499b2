//! Fixed-depth minimax with alpha-beta pruning.
//!
//! Nodes carry their own board, side to move, capture tallies and pass
//! count, so the search never touches the real [`GameState`]. Superko is
//! still honored: a node's candidates are checked against the game's
//! positions plus the boards on the current search path.

use std::cmp::Reverse;
use std::time::Instant;

use fastrand::Rng;
use tracing::debug;

use crate::board::{Board, StoneColor};
use crate::config::ScoringRule;
use crate::constants::{
    EVAL_ALIVE_BONUS, EVAL_ALIVE_LIBERTIES, EVAL_ATARI_BONUS, EVAL_ATARI_PENALTY,
    EVAL_CAPTURE_WEIGHT, EVAL_LIBERTY_WEIGHT, EVAL_TERRITORY_WEIGHT, MAX_SEARCH_BREADTH,
    PASS_THRESHOLD, TERMINAL_VALUE,
};
use crate::game::{GameState, Move};
use crate::heuristic::order_score;
use crate::rules::{self, Placement, PositionHistory};
use crate::strategy::{Strategy, legal_placements, opponent_passed};

/// Positions of the real game plus those reached along the search path.
struct SearchHistory<'a> {
    game: &'a GameState,
    path: &'a [Board],
}

impl PositionHistory for SearchHistory<'_> {
    fn has_occurred(&self, board: &Board) -> bool {
        self.path.contains(board) || self.game.has_occurred(board)
    }
}

#[derive(Clone, Debug)]
struct Node {
    board: Board,
    to_move: StoneColor,
    stones_lost: [u32; 2],
    passes: u32,
}

impl Node {
    fn root(state: &GameState, color: StoneColor) -> Self {
        Node {
            board: state.board().clone(),
            to_move: color,
            stones_lost: [
                state.stones_lost(StoneColor::Black),
                state.stones_lost(StoneColor::White),
            ],
            passes: state.consecutive_passes(),
        }
    }

    fn child(&self, mv: &Move, placement: Placement) -> Node {
        let mut stones_lost = self.stones_lost;
        if let Move::Place { color, .. } = *mv {
            stones_lost[color.opponent().index()] += placement.captured.len() as u32;
        }
        Node {
            board: placement.board,
            to_move: self.to_move.opponent(),
            stones_lost,
            passes: if mv.is_pass() { self.passes + 1 } else { 0 },
        }
    }

    /// Stones captured by each color, Black = 0.
    fn prisoners(&self) -> [u32; 2] {
        [self.stones_lost[1], self.stones_lost[0]]
    }
}

struct Search<'a> {
    game: &'a GameState,
    root: StoneColor,
    breadth: usize,
    rule: ScoringRule,
    komi: f32,
    path: Vec<Board>,
    nodes: u64,
}

impl Search<'_> {
    /// Candidate moves at `node`, best heuristic first, always including a pass.
    fn children(&self, node: &Node) -> Vec<(Move, Placement, i32)> {
        let history = SearchHistory {
            game: self.game,
            path: &self.path,
        };
        let mut moves: Vec<(Move, Placement, i32)> =
            legal_placements(&node.board, node.to_move, &history)
                .into_iter()
                .map(|(pt, placement)| {
                    let mv = Move::place(pt, node.to_move);
                    let score = order_score(&node.board, &mv, &placement, node.passes);
                    (mv, placement, score)
                })
                .collect();
        moves.sort_by_key(|&(_, _, score)| Reverse(score));
        moves.truncate(self.breadth);

        let pass = Move::Pass(node.to_move);
        let stay = Placement {
            board: node.board.clone(),
            captured: Vec::new(),
        };
        let score = order_score(&node.board, &pass, &stay, node.passes);
        moves.push((pass, stay, score));
        moves.sort_by_key(|&(_, _, score)| Reverse(score));
        moves
    }

    fn alphabeta(&mut self, node: &Node, depth: u8, mut alpha: i64, mut beta: i64) -> i64 {
        self.nodes += 1;
        if node.passes >= 2 {
            return self.terminal(node);
        }
        if depth == 0 {
            return self.evaluate(node);
        }

        let maximizing = node.to_move == self.root;
        let mut best = if maximizing { i64::MIN } else { i64::MAX };

        for (mv, placement, _) in self.children(node) {
            let child = node.child(&mv, placement);
            let placed = !mv.is_pass();
            if placed {
                self.path.push(child.board.clone());
            }
            let value = self.alphabeta(&child, depth - 1, alpha, beta);
            if placed {
                self.path.pop();
            }

            if maximizing {
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                best = best.min(value);
                beta = beta.min(best);
            }
            if alpha >= beta {
                break;
            }
        }
        best
    }

    /// Game over after two passes: an extreme value for the winner, nudged
    /// by the margin.
    fn terminal(&self, node: &Node) -> i64 {
        let score = rules::score_board(&node.board, self.rule, node.prisoners(), self.komi);
        let margin = score.margin().round() as i64;
        match score.winner() {
            Some(c) if c == self.root => TERMINAL_VALUE + margin,
            Some(_) => -TERMINAL_VALUE - margin,
            None => 0,
        }
    }

    /// Static evaluation from the root player's point of view.
    fn evaluate(&self, node: &Node) -> i64 {
        let me = self.root;
        let them = me.opponent();
        let board = &node.board;

        let mut value = (node.stones_lost[them.index()] as i64 - node.stones_lost[me.index()] as i64)
            * EVAL_CAPTURE_WEIGHT;

        for group in rules::all_groups(board) {
            let mine = group.color == me;
            let sign = if mine { 1 } else { -1 };
            value += sign * group.liberty_count() as i64 * EVAL_LIBERTY_WEIGHT;

            if group.in_atari() {
                value += if mine {
                    -EVAL_ATARI_PENALTY
                } else {
                    EVAL_ATARI_BONUS
                };
            }
            if group.liberty_count() >= EVAL_ALIVE_LIBERTIES
                && rules::has_two_eyes(board, group.stones[0])
            {
                value += sign * EVAL_ALIVE_BONUS;
            }
        }

        let owned = rules::territory(board);
        value += (owned[me.index()] as i64 - owned[them.index()] as i64) * EVAL_TERRITORY_WEIGHT;
        value
    }
}

/// Minimax over heuristic-ordered candidates, pruned with alpha-beta.
pub struct AlphaBetaStrategy {
    depth: u8,
    breadth: usize,
}

impl AlphaBetaStrategy {
    /// Search `depth` plies (at least one).
    pub fn new(depth: u8) -> Self {
        Self {
            depth: depth.max(1),
            breadth: MAX_SEARCH_BREADTH,
        }
    }

    pub fn with_breadth(mut self, breadth: usize) -> Self {
        self.breadth = breadth.max(1);
        self
    }
}

impl Strategy for AlphaBetaStrategy {
    fn name(&self) -> &'static str {
        "alpha-beta"
    }

    fn select_move(&self, state: &GameState, color: StoneColor, rng: &mut Rng) -> anyhow::Result<Move> {
        let started = Instant::now();
        let mut search = Search {
            game: state,
            root: color,
            breadth: self.breadth,
            rule: state.scoring_rule(),
            komi: state.komi(),
            path: Vec::new(),
            nodes: 0,
        };
        let root = Node::root(state, color);

        // Values above `best - 1` are exact, so equal values can be told apart
        // from pruned ones for the tie-break.
        let mut best = i64::MIN;
        let mut best_moves: Vec<(Move, i32)> = Vec::new();
        for (mv, placement, order) in search.children(&root) {
            let child = root.child(&mv, placement);
            let placed = !mv.is_pass();
            if placed {
                search.path.push(child.board.clone());
            }
            let value = search.alphabeta(&child, self.depth - 1, best.saturating_sub(1), i64::MAX);
            if placed {
                search.path.pop();
            }

            if value > best {
                best = value;
                best_moves.clear();
            }
            if value == best {
                best_moves.push((mv, order));
            }
        }

        if best_moves.is_empty() {
            return Ok(Move::Pass(color));
        }
        let (mut chosen, order) = best_moves[rng.usize(..best_moves.len())];
        if opponent_passed(state) && !chosen.is_pass() && order < PASS_THRESHOLD {
            chosen = Move::Pass(color);
        }

        debug!(
            %color,
            mv = %chosen.to_text(state.board().size()),
            value = best,
            nodes = search.nodes,
            depth = self.depth,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "alpha-beta move"
        );
        Ok(chosen)
    }
}
