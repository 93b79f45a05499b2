//! Game configuration: board size, komi, game mode, clocks and scoring rule.
//!
//! All values arrive as plain data from whatever settings layer sits in
//! front of the engine (a preferences store, a JSON file, CLI flags) and are
//! validated here once. Everything downstream can assume they are in range.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::StoneColor;
use crate::constants::{
    BOARD_SIZES, DEFAULT_BOARD_SIZE, DEFAULT_CANADIAN_MOVES, DEFAULT_CANADIAN_PERIOD_SECS,
    DEFAULT_KOMI, DEFAULT_TIME_BUDGET_SECS, MAX_KOMI,
};
use crate::error::{GoError, Result};

/// How strong a computer opponent plays. Each level maps to one strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Uniformly random legal moves.
    Beginner,
    /// One-ply weighted heuristic.
    Easy,
    /// Alpha-beta search over heuristic-ordered moves.
    Medium,
    /// Monte-Carlo playouts over the best heuristic moves.
    Hard,
}

impl FromStr for Strength {
    type Err = GoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" | "random" => Ok(Strength::Beginner),
            "easy" | "heuristic" => Ok(Strength::Easy),
            "medium" | "alphabeta" | "alpha-beta" => Ok(Strength::Medium),
            "hard" | "montecarlo" | "monte-carlo" => Ok(Strength::Hard),
            other => Err(GoError::InvalidConfiguration(format!(
                "unknown strength '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strength::Beginner => "beginner",
            Strength::Easy => "easy",
            Strength::Medium => "medium",
            Strength::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// Who sits at the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameMode {
    HumanVsHuman,
    HumanVsComputer {
        strength: Strength,
        computer_color: StoneColor,
    },
    ComputerVsComputer {
        black: Strength,
        white: Strength,
    },
}

impl GameMode {
    /// Strength of the computer playing `color`, if that seat is a computer.
    pub fn computer_strength(&self, color: StoneColor) -> Option<Strength> {
        match *self {
            GameMode::HumanVsHuman => None,
            GameMode::HumanVsComputer {
                strength,
                computer_color,
            } => (computer_color == color).then_some(strength),
            GameMode::ComputerVsComputer { black, white } => match color {
                StoneColor::Black => Some(black),
                StoneColor::White => Some(white),
                StoneColor::Empty => None,
            },
        }
    }
}

/// Clock policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeControl {
    /// One budget; running out loses.
    SuddenDeath,
    /// Recognized but without overtime of its own; behaves like sudden death.
    ByoYomi,
    /// Main time, then periods of a fixed number of moves.
    Canadian,
}

impl FromStr for TimeControl {
    type Err = GoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "sudden_death" => Ok(TimeControl::SuddenDeath),
            "byo_yomi" | "byoyomi" => Ok(TimeControl::ByoYomi),
            "canadian" => Ok(TimeControl::Canadian),
            other => Err(GoError::InvalidConfiguration(format!(
                "unknown time control '{other}'"
            ))),
        }
    }
}

/// How a finished board is counted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// Chinese: territory plus stones on the board.
    Area,
    /// Japanese: territory plus prisoners.
    Territory,
}

impl FromStr for ScoringRule {
    type Err = GoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "area" | "chinese" => Ok(ScoringRule::Area),
            "territory" | "japanese" => Ok(ScoringRule::Territory),
            other => Err(GoError::InvalidConfiguration(format!(
                "unknown scoring rule '{other}'"
            ))),
        }
    }
}

/// Validated game settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub board_size: usize,
    pub komi: f32,
    pub game_mode: GameMode,
    pub time_control: TimeControl,
    pub scoring_rule: ScoringRule,
    /// Main time per player.
    pub time_budget_secs: u64,
    /// Moves to complete in each Canadian period.
    pub canadian_moves_per_period: u32,
    /// Length of each Canadian period.
    pub canadian_period_secs: u64,
    /// Seed for the computer players' random choices. `None` seeds from entropy.
    pub ai_seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            komi: DEFAULT_KOMI,
            game_mode: GameMode::HumanVsHuman,
            time_control: TimeControl::SuddenDeath,
            scoring_rule: ScoringRule::Territory,
            time_budget_secs: DEFAULT_TIME_BUDGET_SECS,
            canadian_moves_per_period: DEFAULT_CANADIAN_MOVES,
            canadian_period_secs: DEFAULT_CANADIAN_PERIOD_SECS,
            ai_seed: None,
        }
    }
}

impl Configuration {
    /// Defaults with the given board size and komi.
    pub fn new(board_size: usize, komi: f32) -> Result<Self> {
        Self {
            board_size,
            komi,
            ..Self::default()
        }
        .validated()
    }

    pub fn with_game_mode(mut self, mode: GameMode) -> Result<Self> {
        self.game_mode = mode;
        self.validated()
    }

    pub fn with_time_control(mut self, time_control: TimeControl, budget_secs: u64) -> Result<Self> {
        self.time_control = time_control;
        self.time_budget_secs = budget_secs;
        self.validated()
    }

    pub fn with_canadian_periods(mut self, moves: u32, period_secs: u64) -> Result<Self> {
        self.canadian_moves_per_period = moves;
        self.canadian_period_secs = period_secs;
        self.validated()
    }

    pub fn with_scoring_rule(mut self, rule: ScoringRule) -> Result<Self> {
        self.scoring_rule = rule;
        self.validated()
    }

    pub fn with_ai_seed(mut self, seed: u64) -> Result<Self> {
        self.ai_seed = Some(seed);
        self.validated()
    }

    /// Check every field, returning the configuration unchanged if valid.
    pub fn validated(self) -> Result<Self> {
        let invalid = |msg: String| -> Result<Self> { Err(GoError::InvalidConfiguration(msg)) };

        if !BOARD_SIZES.contains(&self.board_size) {
            return invalid(format!(
                "board size {} not one of {BOARD_SIZES:?}",
                self.board_size
            ));
        }
        if !self.komi.is_finite() || !(0.0..=MAX_KOMI).contains(&self.komi) {
            return invalid(format!("komi {} must be between 0 and {MAX_KOMI}", self.komi));
        }
        if self.time_budget_secs == 0 {
            return invalid("time budget must be positive".into());
        }
        if self.canadian_moves_per_period == 0 || self.canadian_period_secs == 0 {
            return invalid("Canadian periods need a positive move count and length".into());
        }
        if let GameMode::HumanVsComputer { computer_color, .. } = self.game_mode {
            if !computer_color.is_stone() {
                return invalid("computer color must be Black or White".into());
            }
        }
        Ok(self)
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Configuration = serde_json::from_str(json)
            .map_err(|e| GoError::InvalidConfiguration(e.to_string()))?;
        config.validated()
    }

    /// Read and validate a JSON settings file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing settings in {}", path.display()))
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs)
    }

    pub fn canadian_period(&self) -> Duration {
        Duration::from_secs(self.canadian_period_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Configuration::default().validated().unwrap();
        assert_eq!(config.board_size, 9);
        assert_eq!(config.komi, 6.5);
        assert_eq!(config.canadian_moves_per_period, 25);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Configuration::new(7, 6.5).is_err());
        assert!(Configuration::new(19, -0.5).is_err());
        assert!(Configuration::new(19, 50.5).is_err());
        assert!(Configuration::new(19, f32::NAN).is_err());
        assert!(Configuration::new(19, 50.0).is_ok());
        assert!(Configuration::new(4, 0.0).is_ok());

        let base = Configuration::default();
        assert!(base.clone().with_time_control(TimeControl::Canadian, 0).is_err());
        assert!(base.clone().with_canadian_periods(0, 60).is_err());
        assert!(base
            .with_game_mode(GameMode::HumanVsComputer {
                strength: Strength::Easy,
                computer_color: StoneColor::Empty,
            })
            .is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = Configuration::from_json(
            r#"{
                "board_size": 13,
                "komi": 7.5,
                "scoring_rule": "area",
                "game_mode": { "kind": "human_vs_computer", "strength": "medium", "computer_color": "white" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.board_size, 13);
        assert_eq!(config.scoring_rule, ScoringRule::Area);
        assert_eq!(config.time_control, TimeControl::SuddenDeath);
        assert_eq!(
            config.game_mode.computer_strength(StoneColor::White),
            Some(Strength::Medium)
        );
        assert_eq!(config.game_mode.computer_strength(StoneColor::Black), None);

        let err = Configuration::from_json(r#"{ "board_size": 12 }"#).unwrap_err();
        assert!(matches!(err, GoError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Chinese".parse::<ScoringRule>().unwrap(), ScoringRule::Area);
        assert_eq!("japanese".parse::<ScoringRule>().unwrap(), ScoringRule::Territory);
        assert_eq!("sudden-death".parse::<TimeControl>().unwrap(), TimeControl::SuddenDeath);
        assert_eq!("Byo-yomi".parse::<TimeControl>().unwrap(), TimeControl::ByoYomi);
        assert_eq!("HARD".parse::<Strength>().unwrap(), Strength::Hard);
        assert!("grandmaster".parse::<Strength>().is_err());
    }
}
