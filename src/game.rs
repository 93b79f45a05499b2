//! Game state: the board, move history, captures, clocks and the end of the game.
//!
//! A [`GameState`] is created from a [`Configuration`] and then changes only
//! through [`GameState::record_move`] (and its checked front door
//! [`GameState::play`]), [`GameState::undo_last_move`] and the clock
//! operations. Once two consecutive passes, a resignation or a lost clock
//! have been recorded, the state is finished and rejects further moves.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::board::{Board, Coord, StoneColor};
use crate::config::{Configuration, ScoringRule, TimeControl};
use crate::error::{GoError, IllegalMove, Result};
use crate::rules::{self, Placement, PositionHistory, Score};

/// A player action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Place { at: Coord, color: StoneColor },
    Pass(StoneColor),
    Resign(StoneColor),
}

impl Move {
    pub fn place(at: Coord, color: StoneColor) -> Self {
        Move::Place { at, color }
    }

    /// The player making the move.
    pub fn color(&self) -> StoneColor {
        match *self {
            Move::Place { color, .. } | Move::Pass(color) | Move::Resign(color) => color,
        }
    }

    pub fn coord(&self) -> Option<Coord> {
        match *self {
            Move::Place { at, .. } => Some(at),
            _ => None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Move::Pass(_))
    }

    pub fn is_resign(&self) -> bool {
        matches!(self, Move::Resign(_))
    }

    /// Short text form for a board of `size`: "B D4", "W pass", "B resign".
    pub fn to_text(&self, size: usize) -> String {
        let who = match self.color() {
            StoneColor::Black => "B",
            StoneColor::White => "W",
            StoneColor::Empty => "?",
        };
        match *self {
            Move::Place { at, .. } => format!("{who} {}", at.to_vertex(size)),
            Move::Pass(_) => format!("{who} pass"),
            Move::Resign(_) => format!("{who} resign"),
        }
    }
}

/// A move as stored in the history, with what is needed to take it back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    /// Board immediately before the move.
    pub board_before: Board,
    /// Stones removed by the move.
    pub captured: Vec<Coord>,
}

/// Why a game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    BothPassed,
    Resigned(StoneColor),
    OutOfTime(StoneColor),
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::BothPassed => f.write_str("both passed"),
            EndReason::Resigned(c) => write!(f, "{c} resigned"),
            EndReason::OutOfTime(c) => write!(f, "{c} ran out of time"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Finished(EndReason),
}

/// One player's clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Clock {
    pub remaining: Duration,
    /// Main time is used up and Canadian periods are running.
    pub in_overtime: bool,
    /// Moves completed in the current Canadian period.
    pub moves_in_period: u32,
}

/// Complete state of one game.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    history: Vec<MoveRecord>,
    current_player: StoneColor,
    /// Stones of each color removed from the board (Black = 0, White = 1).
    stones_lost: [u32; 2],
    consecutive_passes: u32,
    clocks: [Clock; 2],
    time_control: TimeControl,
    moves_per_period: u32,
    period: Duration,
    status: GameStatus,
    komi: f32,
    scoring_rule: ScoringRule,
    /// Occurrence count of every position reached so far, for superko.
    positions: HashMap<Board, u32>,
}

impl PositionHistory for GameState {
    fn has_occurred(&self, board: &Board) -> bool {
        self.positions.contains_key(board)
    }
}

impl GameState {
    pub fn new(config: &Configuration) -> Self {
        let board = Board::new(config.board_size);
        let clock = Clock {
            remaining: config.time_budget(),
            in_overtime: false,
            moves_in_period: 0,
        };
        let mut positions = HashMap::new();
        positions.insert(board.clone(), 1);

        info!(
            size = config.board_size,
            komi = config.komi,
            time_control = ?config.time_control,
            rule = ?config.scoring_rule,
            "new game"
        );

        Self {
            board,
            history: Vec::new(),
            current_player: StoneColor::Black,
            stones_lost: [0, 0],
            consecutive_passes: 0,
            clocks: [clock, clock],
            time_control: config.time_control,
            moves_per_period: config.canadian_moves_per_period,
            period: config.canadian_period(),
            status: GameStatus::InProgress,
            komi: config.komi,
            scoring_rule: config.scoring_rule,
            positions,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last().map(|r| &r.mv)
    }

    pub fn current_player(&self) -> StoneColor {
        self.current_player
    }

    pub fn consecutive_passes(&self) -> u32 {
        self.consecutive_passes
    }

    /// Stones of `color` that have been captured; 0 for `Empty`.
    pub fn stones_lost(&self, color: StoneColor) -> u32 {
        if !color.is_stone() {
            return 0;
        }
        self.stones_lost[color.index()]
    }

    /// Opponent stones captured by `color`.
    pub fn prisoners(&self, color: StoneColor) -> u32 {
        self.stones_lost(color.opponent())
    }

    pub fn komi(&self) -> f32 {
        self.komi
    }

    pub fn scoring_rule(&self) -> ScoringRule {
        self.scoring_rule
    }

    pub fn time_control(&self) -> TimeControl {
        self.time_control
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, GameStatus::Finished(_))
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.status {
            GameStatus::Finished(reason) => Some(reason),
            GameStatus::InProgress => None,
        }
    }

    /// The clock of a player; `None` for `Empty`.
    pub fn clock(&self, color: StoneColor) -> Option<&Clock> {
        color.is_stone().then(|| &self.clocks[color.index()])
    }

    pub fn time_left(&self, color: StoneColor) -> Duration {
        self.clock(color).map_or(Duration::ZERO, |c| c.remaining)
    }

    /// Moves still owed in the current Canadian period, once overtime started.
    pub fn moves_left_in_period(&self, color: StoneColor) -> Option<u32> {
        let clock = self.clock(color)?;
        (self.time_control == TimeControl::Canadian && clock.in_overtime)
            .then(|| self.moves_per_period.saturating_sub(clock.moves_in_period))
    }

    /// Score the board with the configured rule.
    pub fn score(&self) -> Score {
        rules::score(self, self.scoring_rule)
    }

    /// Winner of a finished game; `None` while in progress or on a tie.
    pub fn winner(&self) -> Option<StoneColor> {
        match self.status {
            GameStatus::InProgress => None,
            GameStatus::Finished(EndReason::Resigned(c) | EndReason::OutOfTime(c)) => {
                Some(c.opponent())
            }
            GameStatus::Finished(EndReason::BothPassed) => self.score().winner(),
        }
    }

    fn finish(&mut self, reason: EndReason) {
        info!(%reason, moves = self.history.len(), "game finished");
        self.status = GameStatus::Finished(reason);
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Commit `mv`, whose resulting board and captures have already been
    /// computed (normally by [`rules::check_move`]).
    pub fn record_move(&mut self, mv: Move, placement: Placement) -> Result<()> {
        if self.is_finished() {
            return Err(GoError::GameFinished);
        }

        let Placement { board, captured } = placement;
        let board_before = std::mem::replace(&mut self.board, board);
        *self.positions.entry(self.board.clone()).or_insert(0) += 1;

        let mover = mv.color();
        if matches!(mv, Move::Place { .. }) {
            self.stones_lost[mover.opponent().index()] += captured.len() as u32;
        }
        if mv.is_pass() {
            self.consecutive_passes += 1;
        } else {
            self.consecutive_passes = 0;
        }
        if !mv.is_resign() {
            self.current_player = self.current_player.opponent();
        }

        debug!(
            mv = %mv.to_text(self.board.size()),
            captured = captured.len(),
            "move recorded"
        );
        self.history.push(MoveRecord {
            mv,
            board_before,
            captured,
        });

        if let Move::Resign(color) = mv {
            self.finish(EndReason::Resigned(color));
        } else if self.consecutive_passes >= 2 {
            self.finish(EndReason::BothPassed);
        }
        Ok(())
    }

    /// Check `mv` against the current state and commit it. Returns the
    /// number of stones captured.
    pub fn play(&mut self, mv: Move) -> Result<usize> {
        if self.is_finished() {
            return Err(GoError::GameFinished);
        }
        if !mv.is_resign() && mv.color() != self.current_player {
            return Err(IllegalMove::WrongTurn.into());
        }
        let placement = rules::check_move(&mv, &self.board, &*self)?;
        let captured = placement.captured_count();
        self.record_move(mv, placement)?;
        Ok(captured)
    }

    /// Apply a move computed in the background against the state as it is
    /// now. Moves that no longer fit (game over, undo changed whose turn it
    /// is, position changed under it) are dropped.
    pub fn submit_computed(&mut self, mv: Move) -> Option<usize> {
        match self.play(mv) {
            Ok(captured) => Some(captured),
            Err(e) => {
                warn!(mv = %mv.to_text(self.board.size()), error = %e, "discarding computed move");
                None
            }
        }
    }

    /// Take back the last move. Returns `false` if there is nothing to undo
    /// or the game has already finished.
    pub fn undo_last_move(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        let Some(record) = self.history.pop() else {
            return false;
        };

        if let Some(count) = self.positions.get_mut(&self.board) {
            *count -= 1;
            if *count == 0 {
                self.positions.remove(&self.board);
            }
        }
        self.board = record.board_before;

        let mover = record.mv.color();
        if matches!(record.mv, Move::Place { .. }) {
            let lost = &mut self.stones_lost[mover.opponent().index()];
            *lost = lost.saturating_sub(record.captured.len() as u32);
        }
        self.consecutive_passes = self
            .history
            .iter()
            .rev()
            .take_while(|r| r.mv.is_pass())
            .count() as u32;
        self.current_player = mover;

        if mover.is_stone() {
            let clock = &mut self.clocks[mover.index()];
            if clock.in_overtime {
                clock.moves_in_period = clock.moves_in_period.saturating_sub(1);
            }
        }
        self.status = GameStatus::InProgress;
        debug!(mv = %record.mv.to_text(self.board.size()), "move undone");
        true
    }

    // =========================================================================
    // Clocks
    // =========================================================================

    /// Subtract `elapsed` from `color`'s clock, clamped at zero.
    ///
    /// An exhausted clock loses the game, except under Canadian overtime
    /// where it starts a fresh period instead.
    pub fn update_time(&mut self, color: StoneColor, elapsed: Duration) {
        if self.is_finished() || !color.is_stone() {
            return;
        }
        self.drain_clock(color, elapsed);
    }

    /// Returns `true` if the clock ran out.
    fn drain_clock(&mut self, color: StoneColor, elapsed: Duration) -> bool {
        let clock = &mut self.clocks[color.index()];
        clock.remaining = clock.remaining.saturating_sub(elapsed);
        if !clock.remaining.is_zero() {
            return false;
        }

        match self.time_control {
            TimeControl::Canadian => {
                if clock.in_overtime {
                    // Failing a period is not enforced as a loss.
                    warn!(%color, "Canadian period expired; granting a new period");
                } else {
                    info!(%color, "main time used up; entering Canadian overtime");
                }
                clock.in_overtime = true;
                clock.remaining = self.period;
                clock.moves_in_period = 0;
            }
            TimeControl::SuddenDeath | TimeControl::ByoYomi => {
                self.finish(EndReason::OutOfTime(color));
            }
        }
        true
    }

    /// Set `color`'s clock to `period` and restart its move count.
    pub fn reset_time_period(&mut self, color: StoneColor, period: Duration) {
        if self.is_finished() || !color.is_stone() {
            return;
        }
        let clock = &mut self.clocks[color.index()];
        clock.remaining = period;
        clock.moves_in_period = 0;
    }

    /// Charge `elapsed` for a move just made by `color`, including Canadian
    /// period bookkeeping: completing the required number of moves in a
    /// period resets the period clock.
    pub fn apply_elapsed(&mut self, color: StoneColor, elapsed: Duration) {
        if self.is_finished() || !color.is_stone() {
            return;
        }
        let was_overtime = self.clocks[color.index()].in_overtime;
        if self.drain_clock(color, elapsed) {
            return;
        }
        if self.time_control != TimeControl::Canadian || !was_overtime {
            return;
        }

        let clock = &mut self.clocks[color.index()];
        clock.moves_in_period += 1;
        if clock.moves_in_period >= self.moves_per_period {
            info!(%color, "Canadian period completed; new period started");
            self.reset_time_period(color, self.period);
        }
    }
}
