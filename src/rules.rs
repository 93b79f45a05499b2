//! Rules of Go: legality, capture resolution, liberties, eyes and scoring.
//!
//! Every legality check works by "simulate on a copy, then compare": the
//! stone is placed on a copy of the board, opponent groups left without
//! liberties are removed, and the result is tested for suicide and for
//! positional superko against the positions that have already occurred.
//!
//! All flood fills use an explicit stack so that a 19x19 board full of one
//! group cannot exhaust the call stack.

use std::fmt;

use crate::board::{Board, Coord, StoneColor};
use crate::config::ScoringRule;
use crate::error::{IllegalMove, Result};
use crate::game::{GameState, Move};

/// Something that remembers which board positions have already occurred.
pub trait PositionHistory {
    fn has_occurred(&self, board: &Board) -> bool;
}

impl PositionHistory for [Board] {
    fn has_occurred(&self, board: &Board) -> bool {
        self.contains(board)
    }
}

impl PositionHistory for Vec<Board> {
    fn has_occurred(&self, board: &Board) -> bool {
        self.as_slice().has_occurred(board)
    }
}

/// History that remembers nothing; disables the superko check.
pub struct NoHistory;

impl PositionHistory for NoHistory {
    fn has_occurred(&self, _board: &Board) -> bool {
        false
    }
}

/// The board after a move together with the stones it removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub board: Board,
    pub captured: Vec<Coord>,
}

impl Placement {
    pub fn captured_count(&self) -> usize {
        self.captured.len()
    }
}

/// A maximal set of connected same-colored stones and its liberties.
#[derive(Clone, Debug)]
pub struct Group {
    pub color: StoneColor,
    pub stones: Vec<Coord>,
    pub liberties: Vec<Coord>,
}

impl Group {
    pub fn liberty_count(&self) -> usize {
        self.liberties.len()
    }

    pub fn in_atari(&self) -> bool {
        self.liberties.len() == 1
    }
}

// =============================================================================
// Groups and Liberties
// =============================================================================

/// Flood-fill the group containing `seed`. Returns `None` for an empty point.
pub fn group_at(board: &Board, seed: Coord) -> Option<Group> {
    let color = board.get(seed).ok()?;
    if !color.is_stone() {
        return None;
    }

    let size = board.size();
    let mut visited = vec![false; size * size];
    let mut liberty_seen = vec![false; size * size];
    let mut stones = Vec::new();
    let mut liberties = Vec::new();
    let mut stack = vec![seed];
    visited[seed.row * size + seed.col] = true;

    while let Some(pt) = stack.pop() {
        stones.push(pt);
        for n in board.neighbors(pt) {
            let i = n.row * size + n.col;
            match board.at(n) {
                StoneColor::Empty => {
                    if !liberty_seen[i] {
                        liberty_seen[i] = true;
                        liberties.push(n);
                    }
                }
                c if c == color && !visited[i] => {
                    visited[i] = true;
                    stack.push(n);
                }
                _ => {}
            }
        }
    }

    Some(Group {
        color,
        stones,
        liberties,
    })
}

/// All stones connected to `seed` (empty if `seed` is empty).
pub fn group(board: &Board, seed: Coord) -> Vec<Coord> {
    group_at(board, seed).map(|g| g.stones).unwrap_or_default()
}

/// Number of distinct liberties of the group at `seed` if it has `color`.
///
/// Returns 0 when the point holds anything else, so a zero result means
/// "captured or suicide candidate" only for an actual stone of `color`.
pub fn liberties(board: &Board, seed: Coord, color: StoneColor) -> usize {
    match group_at(board, seed) {
        Some(g) if g.color == color => g.liberty_count(),
        _ => 0,
    }
}

/// The distinct liberties of the group at `seed`, if it holds a stone.
pub fn liberty_points(board: &Board, seed: Coord) -> Vec<Coord> {
    group_at(board, seed).map(|g| g.liberties).unwrap_or_default()
}

/// Whether the group at `at` has exactly one liberty.
pub fn in_atari(board: &Board, at: Coord) -> bool {
    group_at(board, at).is_some_and(|g| g.in_atari())
}

/// Every group on the board, each reported once.
pub fn all_groups(board: &Board) -> Vec<Group> {
    let size = board.size();
    let mut seen = vec![false; size * size];
    let mut groups = Vec::new();
    for pt in board.points() {
        if seen[pt.row * size + pt.col] || !board.at(pt).is_stone() {
            continue;
        }
        if let Some(g) = group_at(board, pt) {
            for s in &g.stones {
                seen[s.row * size + s.col] = true;
            }
            groups.push(g);
        }
    }
    groups
}

// =============================================================================
// Captures and Move Application
// =============================================================================

/// Resolve captures caused by the stone just placed at `last`.
///
/// `board` must already contain the new stone. Every opponent group next to
/// `last` left without liberties is removed; a group touching `last` from
/// several sides is only processed once. Returns the board and the removed
/// coordinates.
pub fn apply_captures(mut board: Board, last: Coord, color: StoneColor) -> (Board, Vec<Coord>) {
    let opponent = color.opponent();
    let size = board.size();
    let mut processed = vec![false; size * size];
    let mut captured = Vec::new();

    for n in board.neighbors(last) {
        if board.at(n) != opponent || processed[n.row * size + n.col] {
            continue;
        }
        let Some(g) = group_at(&board, n) else {
            continue;
        };
        for s in &g.stones {
            processed[s.row * size + s.col] = true;
        }
        if g.liberties.is_empty() {
            for &s in &g.stones {
                board.put(s, StoneColor::Empty);
            }
            captured.extend(g.stones);
        }
    }
    (board, captured)
}

/// Board after `mv`, without any legality check. Pass and resign return an
/// unchanged copy.
pub fn apply_move(mv: &Move, board: &Board) -> Result<Placement> {
    match *mv {
        Move::Place { at, color } => {
            let mut next = board.copy();
            next.set(at, color)?;
            let (next, captured) = apply_captures(next, at, color);
            Ok(Placement {
                board: next,
                captured,
            })
        }
        Move::Pass(_) | Move::Resign(_) => Ok(Placement {
            board: board.copy(),
            captured: Vec::new(),
        }),
    }
}

/// Check `mv` against `board` and the positions in `history`; on success
/// return the resulting placement.
pub fn check_move<H>(mv: &Move, board: &Board, history: &H) -> std::result::Result<Placement, IllegalMove>
where
    H: PositionHistory + ?Sized,
{
    let (at, color) = match *mv {
        Move::Place { at, color } => (at, color),
        Move::Pass(_) | Move::Resign(_) => {
            return Ok(Placement {
                board: board.copy(),
                captured: Vec::new(),
            });
        }
    };

    if !color.is_stone() {
        return Err(IllegalMove::WrongTurn);
    }
    if !board.contains(at) {
        return Err(IllegalMove::OffBoard);
    }
    if board.at(at).is_stone() {
        return Err(IllegalMove::Occupied);
    }

    let mut next = board.copy();
    next.put(at, color);
    let (next, captured) = apply_captures(next, at, color);

    if captured.is_empty() && liberties(&next, at, color) == 0 {
        return Err(IllegalMove::Suicide);
    }
    if history.has_occurred(&next) {
        return Err(IllegalMove::Superko);
    }

    Ok(Placement {
        board: next,
        captured,
    })
}

/// Whether `mv` may be played in `state` (turn order is not checked).
pub fn is_legal(mv: &Move, state: &GameState) -> bool {
    check_move(mv, state.board(), state).is_ok()
}

// =============================================================================
// Eyes
// =============================================================================

/// Whether the empty point `at` is a true eye of `color`.
///
/// All on-board orthogonal neighbors must be `color`; at least 3 of the 4
/// diagonals must be `color`, empty or off the board; and every group
/// forming the eye must have a second liberty.
pub fn is_true_eye(board: &Board, at: Coord, color: StoneColor) -> bool {
    if !board.contains(at) || board.at(at).is_stone() || !color.is_stone() {
        return false;
    }
    if board.neighbors(at).any(|n| board.at(n) != color) {
        return false;
    }

    let on_board = board.diagonals(at).count();
    let off_board = 4 - on_board;
    let friendly = board
        .diagonals(at)
        .filter(|&d| board.at(d) != color.opponent())
        .count();
    if friendly + off_board < 3 {
        return false;
    }

    board.neighbors(at).all(|n| liberties(board, n, color) >= 2)
}

/// Whether the group at `seed` borders at least two true eyes.
pub fn has_two_eyes(board: &Board, seed: Coord) -> bool {
    let Some(g) = group_at(board, seed) else {
        return false;
    };
    g.liberties
        .iter()
        .filter(|&&lib| is_true_eye(board, lib, g.color))
        .take(2)
        .count()
        >= 2
}

// =============================================================================
// Scoring
// =============================================================================

/// Final totals. Komi is already included in White's.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Score {
    pub black: f32,
    pub white: f32,
}

impl Score {
    pub fn of(&self, color: StoneColor) -> f32 {
        match color {
            StoneColor::Black => self.black,
            StoneColor::White => self.white,
            StoneColor::Empty => 0.0,
        }
    }

    /// The leading color, or `None` on a tie.
    pub fn winner(&self) -> Option<StoneColor> {
        if self.black > self.white {
            Some(StoneColor::Black)
        } else if self.white > self.black {
            Some(StoneColor::White)
        } else {
            None
        }
    }

    pub fn margin(&self) -> f32 {
        (self.black - self.white).abs()
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner() {
            Some(StoneColor::Black) => write!(f, "B+{:.1}", self.margin()),
            Some(_) => write!(f, "W+{:.1}", self.margin()),
            None => f.write_str("Jigo"),
        }
    }
}

/// Stones of each color on the board, indexed Black = 0, White = 1.
pub fn count_stones(board: &Board) -> [usize; 2] {
    [board.count(StoneColor::Black), board.count(StoneColor::White)]
}

/// Empty points owned by each color, indexed Black = 0, White = 1.
///
/// A region counts for a color only if every stone on its border has that
/// color; regions with mixed or no bordering stones are neutral.
pub fn territory(board: &Board) -> [usize; 2] {
    let size = board.size();
    let mut visited = vec![false; size * size];
    let mut owned = [0usize; 2];

    for start in board.points() {
        if visited[start.row * size + start.col] || board.at(start).is_stone() {
            continue;
        }

        let mut region = 0usize;
        let mut borders_black = false;
        let mut borders_white = false;
        let mut stack = vec![start];
        visited[start.row * size + start.col] = true;

        while let Some(pt) = stack.pop() {
            region += 1;
            for n in board.neighbors(pt) {
                let i = n.row * size + n.col;
                match board.at(n) {
                    StoneColor::Empty => {
                        if !visited[i] {
                            visited[i] = true;
                            stack.push(n);
                        }
                    }
                    StoneColor::Black => borders_black = true,
                    StoneColor::White => borders_white = true,
                }
            }
        }

        match (borders_black, borders_white) {
            (true, false) => owned[0] += region,
            (false, true) => owned[1] += region,
            _ => {}
        }
    }
    owned
}

/// Score a board. `prisoners[c]` is the number of stones color `c` captured.
///
/// Every stone on the board is treated as alive.
pub fn score_board(board: &Board, rule: ScoringRule, prisoners: [u32; 2], komi: f32) -> Score {
    let owned = territory(board);
    let (black, white) = match rule {
        ScoringRule::Area => {
            let stones = count_stones(board);
            (owned[0] + stones[0], owned[1] + stones[1])
        }
        ScoringRule::Territory => (
            owned[0] + prisoners[0] as usize,
            owned[1] + prisoners[1] as usize,
        ),
    };
    Score {
        black: black as f32,
        white: white as f32 + komi,
    }
}

/// Score the current position of `state` under `rule`.
pub fn score(state: &GameState, rule: ScoringRule) -> Score {
    let prisoners = [
        state.prisoners(StoneColor::Black),
        state.prisoners(StoneColor::White),
    ];
    score_board(state.board(), rule, prisoners, state.komi())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(diagram: &str) -> Board {
        diagram.parse().unwrap()
    }

    fn place(row: usize, col: usize, color: StoneColor) -> Move {
        Move::Place {
            at: Coord::new(row, col),
            color,
        }
    }

    #[test]
    fn test_group_liberties() {
        let b = board(
            "
            . . . . .
            . X X . .
            . . X O .
            . . . . .
            . . . . .
        ",
        );
        let g = group_at(&b, Coord::new(1, 1)).unwrap();
        assert_eq!(g.stones.len(), 3);
        // (0,1) (0,2) (1,0) (1,3) (2,1) (3,2)
        assert_eq!(g.liberty_count(), 6);
        assert_eq!(liberties(&b, Coord::new(2, 3), StoneColor::White), 3);
        assert_eq!(liberties(&b, Coord::new(2, 3), StoneColor::Black), 0);
        assert_eq!(liberties(&b, Coord::new(0, 0), StoneColor::Black), 0);
        let mut libs = liberty_points(&b, Coord::new(2, 3));
        libs.sort();
        assert_eq!(libs, vec![Coord::new(1, 3), Coord::new(2, 4), Coord::new(3, 3)]);
        assert_eq!(count_stones(&b), [3, 1]);
        assert!(group(&b, Coord::new(0, 0)).is_empty());
    }

    #[test]
    fn test_single_capture() {
        let b = board(
            "
            . X . .
            X O . .
            . X . .
            . . . .
        ",
        );
        let placement = check_move(&place(1, 2, StoneColor::Black), &b, &NoHistory).unwrap();
        assert_eq!(placement.captured, vec![Coord::new(1, 1)]);
        assert_eq!(placement.board.at(Coord::new(1, 1)), StoneColor::Empty);
    }

    #[test]
    fn test_group_captured_once_from_two_sides() {
        // The placed stone touches the same White group from the east and south.
        let b = board(
            "
            . O X .
            O O X .
            X X . .
            . . . .
        ",
        );
        let p = check_move(&place(0, 0, StoneColor::Black), &b, &NoHistory).unwrap();
        let mut captured = p.captured.clone();
        captured.sort();
        assert_eq!(
            captured,
            vec![Coord::new(0, 1), Coord::new(1, 0), Coord::new(1, 1)]
        );
        assert_eq!(p.board.count(StoneColor::White), 0);
    }

    #[test]
    fn test_apply_captures_removes_dead_neighbors() {
        let b = board(
            "
            . X . .
            X O X .
            . X . .
            . . . .
        ",
        );
        let (after, captured) = apply_captures(b, Coord::new(1, 2), StoneColor::Black);
        assert_eq!(captured, vec![Coord::new(1, 1)]);
        assert_eq!(after.at(Coord::new(1, 1)), StoneColor::Empty);
        assert_eq!(after.count(StoneColor::Black), 4);

        // One White group reached from the east and the south of (0,0).
        let b = board(
            "
            X O X .
            O O X .
            X X . .
            . . . .
        ",
        );
        let (after, mut captured) = apply_captures(b, Coord::new(0, 0), StoneColor::Black);
        captured.sort();
        assert_eq!(
            captured,
            vec![Coord::new(0, 1), Coord::new(1, 0), Coord::new(1, 1)]
        );
        assert_eq!(after.count(StoneColor::White), 0);
        for g in all_groups(&after) {
            assert!(g.liberty_count() > 0);
        }

        // A neighbor that still breathes stays.
        let b = board(
            "
            . O X .
            . X . .
            . . . .
            . . . .
        ",
        );
        let (after, captured) = apply_captures(b.clone(), Coord::new(1, 1), StoneColor::Black);
        assert!(captured.is_empty());
        assert_eq!(after, b);
    }

    #[test]
    fn test_capture_needs_last_liberty() {
        let b = board(
            "
            . X . .
            X O X .
            . O X .
            X . . .
        ",
        );
        let p = check_move(&place(3, 1, StoneColor::Black), &b, &NoHistory).unwrap();
        // White group (1,1)-(2,1) still breathes at (2,0)
        assert!(p.captured.is_empty());
        let p = check_move(&place(2, 0, StoneColor::Black), &p.board, &NoHistory).unwrap();
        assert_eq!(p.captured.len(), 2);
    }

    #[test]
    fn test_suicide_rejected() {
        let b = board(
            "
            . X . .
            X . . .
            . . . .
            . . . .
        ",
        );
        assert_eq!(
            check_move(&place(0, 0, StoneColor::White), &b, &NoHistory),
            Err(IllegalMove::Suicide)
        );
        // Black filling its own last liberty there is fine (group keeps liberties)
        assert!(check_move(&place(0, 0, StoneColor::Black), &b, &NoHistory).is_ok());
    }

    #[test]
    fn test_capture_beats_suicide() {
        let b = board(
            "
            . X O .
            X O . .
            O . . .
            . . . .
        ",
        );
        // White at (0,0) has no liberties of its own but captures (0,1)/(1,0)?
        // (0,1) X has liberty only at (0,0); (1,0) X likewise.
        let p = check_move(&place(0, 0, StoneColor::White), &b, &NoHistory).unwrap();
        assert_eq!(p.captured.len(), 2);
    }

    #[test]
    fn test_occupied_and_off_board() {
        let b = board(
            "
            X . . .
            . . . .
            . . . .
            . . . .
        ",
        );
        assert_eq!(
            check_move(&place(0, 0, StoneColor::White), &b, &NoHistory),
            Err(IllegalMove::Occupied)
        );
        assert_eq!(
            check_move(&place(4, 0, StoneColor::White), &b, &NoHistory),
            Err(IllegalMove::OffBoard)
        );
        assert!(check_move(&Move::Pass(StoneColor::White), &b, &NoHistory).is_ok());
    }

    #[test]
    fn test_ko_recapture_is_superko() {
        let before = board(
            "
            . X O . .
            X O . O .
            . X O . .
            . . . . .
            . . . . .
        ",
        );
        let take = check_move(&place(1, 2, StoneColor::Black), &before, &NoHistory).unwrap();
        assert_eq!(take.captured, vec![Coord::new(1, 1)]);

        let history = vec![before.clone(), take.board.clone()];
        let retake = check_move(&place(1, 1, StoneColor::White), &take.board, &history);
        assert_eq!(retake, Err(IllegalMove::Superko));
        // Without history the recapture itself is a normal capture.
        let retake = check_move(&place(1, 1, StoneColor::White), &take.board, &NoHistory).unwrap();
        assert_eq!(retake.board, before);
    }

    #[test]
    fn test_true_eye() {
        let b = board(
            "
            . X . X .
            X X X X X
            . . . . .
            . . . . .
            . . . . .
        ",
        );
        assert!(is_true_eye(&b, Coord::new(0, 0), StoneColor::Black));
        assert!(is_true_eye(&b, Coord::new(0, 2), StoneColor::Black));
        assert!(!is_true_eye(&b, Coord::new(0, 2), StoneColor::White));
        assert!(!is_true_eye(&b, Coord::new(2, 2), StoneColor::Black));
        assert!(has_two_eyes(&b, Coord::new(1, 1)));

        // Two opponent diagonals make a false eye.
        let b = board(
            "
            O . O . .
            . X . . .
            O X X . .
            . . . . .
            . . . . .
        ",
        );
        let false_eye = board(
            "
            O X O . .
            X . X . .
            O X O . .
            . . . . .
            . . . . .
        ",
        );
        assert!(!is_true_eye(&false_eye, Coord::new(1, 1), StoneColor::Black));
        assert!(!has_two_eyes(&b, Coord::new(1, 1)));
    }

    #[test]
    fn test_territory_and_scores() {
        let b = board(
            "
            . X O .
            . X O .
            . X O .
            . X O .
        ",
        );
        assert_eq!(territory(&b), [4, 4]);

        let area = score_board(&b, ScoringRule::Area, [0, 0], 0.5);
        assert_eq!(area, Score { black: 8.0, white: 8.5 });
        assert_eq!(area.winner(), Some(StoneColor::White));
        assert_eq!(area.to_string(), "W+0.5");

        let japanese = score_board(&b, ScoringRule::Territory, [3, 1], 0.5);
        assert_eq!(japanese, Score { black: 7.0, white: 5.5 });
        assert_eq!(japanese.to_string(), "B+1.5");
    }

    #[test]
    fn test_dame_is_neutral() {
        let b = board(
            "
            X . O .
            X . O .
            X . O .
            X . O .
        ",
        );
        // Column 1 borders both colors; column 3 is White's.
        assert_eq!(territory(&b), [0, 4]);
        assert_eq!(territory(&Board::new(9)), [0, 0]);
    }

    #[test]
    fn test_all_groups_reports_each_once() {
        let b = board(
            "
            X X . O
            . X . O
            . . . .
            O . . X
        ",
        );
        let groups = all_groups(&b);
        assert_eq!(groups.len(), 4);
        assert_eq!(groups.iter().map(|g| g.stones.len()).sum::<usize>(), 7);
    }
}
