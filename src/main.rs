//! Go Engine command line driver.
//!
//! ## Usage
//!
//! - `go-engine` - Show a demo
//! - `go-engine selfplay --black hard --white easy` - Computer against computer
//! - `go-engine play --strength medium --color white` - Play the computer from the terminal
//! - `go-engine demo` - Scripted capture demo

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use go_engine::board::{Coord, StoneColor};
use go_engine::config::{Configuration, GameMode, ScoringRule, Strength};
use go_engine::game::{GameState, Move};
use go_engine::player::Player;
use go_engine::rules;

/// Go Engine: rules and computer opponents for the game of Go
#[derive(Parser)]
#[command(name = "go-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Let two computer players play a full game
    Selfplay {
        #[arg(long, default_value = "medium")]
        black: Strength,
        #[arg(long, default_value = "easy")]
        white: Strength,
        /// Stop the game after this many moves
        #[arg(long, default_value_t = 600)]
        max_moves: usize,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Play against the computer; enter moves like D4, pass, resign, undo
    Play {
        #[arg(long, default_value = "easy")]
        strength: Strength,
        /// Color the computer plays
        #[arg(long, default_value = "white")]
        color: StoneColor,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Run a short scripted demo of the rules engine
    Demo,
}

#[derive(Args)]
struct GameArgs {
    /// Board size (4, 9, 13 or 19)
    #[arg(long)]
    size: Option<usize>,
    #[arg(long)]
    komi: Option<f32>,
    /// Scoring rule: area (chinese) or territory (japanese)
    #[arg(long)]
    rule: Option<ScoringRule>,
    /// Seed for the computer players
    #[arg(long)]
    seed: Option<u64>,
    /// JSON settings file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

impl GameArgs {
    fn configuration(&self, mode: GameMode) -> Result<Configuration> {
        let mut config = match &self.config {
            Some(path) => Configuration::load(path)?,
            None => Configuration::default(),
        };
        if let Some(size) = self.size {
            config.board_size = size;
        }
        if let Some(komi) = self.komi {
            config.komi = komi;
        }
        if let Some(rule) = self.rule {
            config.scoring_rule = rule;
        }
        if self.seed.is_some() {
            config.ai_seed = self.seed;
        }
        config.game_mode = mode;
        config.validated().context("invalid game settings")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Selfplay {
            black,
            white,
            max_moves,
            game,
        }) => {
            let config = game.configuration(GameMode::ComputerVsComputer { black, white })?;
            run_selfplay(&config, max_moves)
        }
        Some(Commands::Play {
            strength,
            color,
            game,
        }) => {
            let config = game.configuration(GameMode::HumanVsComputer {
                strength,
                computer_color: color,
            })?;
            run_play(&config)
        }
        Some(Commands::Demo) | None => run_demo(),
    }
}

/// Ask `player` for a move through the callback contract and wait for it.
fn request(player: &Player, state: &GameState, rx: &mpsc::Receiver<Move>, tx: &mpsc::Sender<Move>) -> Result<Move> {
    let tx = tx.clone();
    player.request_move(
        state,
        Box::new(move |mv| {
            // The loop may have stopped listening; nothing to do then.
            let _ = tx.send(mv);
        }),
    )?;
    rx.recv().context("player hung up without a move")
}

/// Charge the clock and apply a computed move, falling back to a pass.
fn commit(state: &mut GameState, color: StoneColor, mv: Move, started: Instant) -> Result<()> {
    state.apply_elapsed(color, started.elapsed());
    if state.is_finished() {
        return Ok(());
    }
    if state.submit_computed(mv).is_none() {
        state.play(Move::Pass(color))?;
    }
    Ok(())
}

fn print_result(state: &GameState) {
    println!("{}", state.board());
    let score = state.score();
    match state.end_reason() {
        Some(reason) => println!("Game over: {reason}"),
        None => println!("Game stopped after {} moves", state.history().len()),
    }
    println!(
        "Black {:.1}, White {:.1} ({:?} scoring): {score}",
        score.black,
        score.white,
        state.scoring_rule()
    );
}

fn run_selfplay(config: &Configuration, max_moves: usize) -> Result<()> {
    let mut state = GameState::new(config);
    let black = Player::from_config(config, StoneColor::Black);
    let white = Player::from_config(config, StoneColor::White);
    let (tx, rx) = mpsc::channel();
    let size = config.board_size;

    while !state.is_finished() && state.history().len() < max_moves {
        let color = state.current_player();
        let player = if color == StoneColor::Black { &black } else { &white };
        let started = Instant::now();
        let mv = request(player, &state, &rx, &tx)?;
        println!("{:>4}. {}", state.history().len() + 1, mv.to_text(size));
        commit(&mut state, color, mv, started)?;
    }

    if !state.is_finished() {
        warn!(max_moves, "move limit reached");
    }
    print_result(&state);
    Ok(())
}

enum Command {
    Play(Move),
    Undo,
    Quit,
}

fn parse_command(line: &str, size: usize, color: StoneColor) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "pass" => Some(Command::Play(Move::Pass(color))),
        "resign" => Some(Command::Play(Move::Resign(color))),
        "undo" => Some(Command::Undo),
        "quit" | "exit" => Some(Command::Quit),
        vertex => Coord::parse_vertex(vertex, size).map(|at| Command::Play(Move::place(at, color))),
    }
}

/// Take back the computer's answer and the human move before it.
///
/// Does nothing unless both moves can go; the computer's opening move alone
/// is left in place.
fn undo_turn(state: &mut GameState) -> bool {
    if state.is_finished() || state.history().len() < 2 {
        return false;
    }
    state.undo_last_move() && state.undo_last_move()
}

fn run_play(config: &Configuration) -> Result<()> {
    let mut state = GameState::new(config);
    let black = Player::from_config(config, StoneColor::Black);
    let white = Player::from_config(config, StoneColor::White);
    let (tx, rx) = mpsc::channel();
    let size = config.board_size;
    let mut lines = io::stdin().lock().lines();

    while !state.is_finished() {
        let color = state.current_player();
        let player = if color == StoneColor::Black { &black } else { &white };
        let started = Instant::now();

        if let Player::Human(human) = player {
            println!("{}", state.board());
            print!("{color} to play: ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                info!("input closed");
                return Ok(());
            };
            match parse_command(&line?, size, color) {
                Some(Command::Play(mv)) => {
                    human.request_move(Box::new({
                        let tx = tx.clone();
                        move |mv| {
                            let _ = tx.send(mv);
                        }
                    }))?;
                    human.provide(mv);
                    let mv = rx.recv().context("human move lost")?;
                    state.apply_elapsed(color, started.elapsed());
                    if state.is_finished() {
                        break;
                    }
                    if let Err(e) = state.play(mv) {
                        println!("Illegal move: {e}");
                    }
                }
                Some(Command::Undo) => {
                    if !undo_turn(&mut state) {
                        println!("Nothing to undo");
                    }
                }
                Some(Command::Quit) => return Ok(()),
                None => println!("Enter a point like D4, or pass, resign, undo, quit"),
            }
            continue;
        }

        let mv = request(player, &state, &rx, &tx)?;
        println!("{} plays {}", color, mv.to_text(size));
        commit(&mut state, color, mv, started)?;
    }

    print_result(&state);
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Go Engine: rules and computer opponents\n");

    let config = Configuration::new(9, 6.5)?;
    let mut state = GameState::new(&config);

    println!("=== Opening move ===");
    let center = Move::place(Coord::new(4, 4), StoneColor::Black);
    println!("Black at E5 legal: {}", rules::is_legal(&center, &state));
    state.play(center)?;
    println!("{}", state.board());

    println!("=== Capture ===");
    let mut state = GameState::new(&config);
    let script = [
        Move::place(Coord::new(0, 1), StoneColor::Black),
        Move::place(Coord::new(1, 1), StoneColor::White),
        Move::place(Coord::new(2, 1), StoneColor::Black),
        Move::Pass(StoneColor::White),
        Move::place(Coord::new(1, 0), StoneColor::Black),
        Move::Pass(StoneColor::White),
        Move::place(Coord::new(1, 2), StoneColor::Black),
    ];
    for mv in script {
        let captured = state.play(mv)?;
        if captured > 0 {
            println!("{} captured {captured}", mv.to_text(config.board_size));
        }
    }
    println!("{}", state.board());
    if state.board().get(Coord::new(1, 1))? != StoneColor::Empty {
        bail!("capture demo left the White stone on the board");
    }

    println!("=== Computer reply ===");
    let computer = Player::from_config(
        &config.clone().with_game_mode(GameMode::ComputerVsComputer {
            black: Strength::Easy,
            white: Strength::Easy,
        })?,
        StoneColor::White,
    );
    let (tx, rx) = mpsc::channel();
    let mv = request(&computer, &state, &rx, &tx)?;
    println!("White answers {}", mv.to_text(config.board_size));
    println!("Score so far: {}", state.score());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_turn_takes_back_two_moves() {
        let mut state = GameState::new(&Configuration::new(9, 6.5).unwrap());
        state.play(Move::place(Coord::new(4, 4), StoneColor::Black)).unwrap();
        // Only the computer's opening move: nothing of ours to take back.
        assert!(!undo_turn(&mut state));
        assert_eq!(state.history().len(), 1);

        state.play(Move::place(Coord::new(2, 2), StoneColor::White)).unwrap();
        state.play(Move::place(Coord::new(6, 6), StoneColor::Black)).unwrap();
        assert!(undo_turn(&mut state));
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.current_player(), StoneColor::White);
    }

    #[test]
    fn test_parse_command() {
        assert!(matches!(
            parse_command("D4", 9, StoneColor::Black),
            Some(Command::Play(Move::Place { .. }))
        ));
        assert!(matches!(parse_command(" undo ", 9, StoneColor::Black), Some(Command::Undo)));
        assert!(parse_command("Z99", 9, StoneColor::Black).is_none());
    }
}
