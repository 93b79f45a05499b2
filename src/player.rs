//! Players: humans feeding moves from outside, computers running a strategy.
//!
//! Both kinds hand their move to a one-shot [`MoveCallback`]. A computer
//! computes on a worker thread, so the caller never blocks; the callback
//! runs on that thread and should only forward the move (for example into
//! an `mpsc` channel) to the turn loop, which applies it with
//! [`GameState::submit_computed`](crate::game::GameState::submit_computed).

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use fastrand::Rng;
use tracing::{debug, warn};

use crate::board::StoneColor;
use crate::config::Configuration;
use crate::error::{GoError, Result};
use crate::game::{GameState, Move};
use crate::strategy::{self, Strategy};

/// Receives exactly one move.
pub type MoveCallback = Box<dyn FnOnce(Move) + Send>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A player whose moves come from outside the engine.
pub struct HumanPlayer {
    color: StoneColor,
    pending: Mutex<Option<MoveCallback>>,
}

impl HumanPlayer {
    pub fn new(color: StoneColor) -> Self {
        Self {
            color,
            pending: Mutex::new(None),
        }
    }

    pub fn color(&self) -> StoneColor {
        self.color
    }

    /// Park `callback` until [`provide`](Self::provide) is called.
    pub fn request_move(&self, callback: MoveCallback) -> Result<()> {
        let mut pending = lock(&self.pending);
        if pending.is_some() {
            return Err(GoError::MovePending);
        }
        *pending = Some(callback);
        Ok(())
    }

    /// Deliver `mv` to the parked callback. Returns `false` if no move was
    /// requested.
    pub fn provide(&self, mv: Move) -> bool {
        let callback = lock(&self.pending).take();
        match callback {
            Some(callback) => {
                callback(mv);
                true
            }
            None => false,
        }
    }

    pub fn is_waiting(&self) -> bool {
        lock(&self.pending).is_some()
    }
}

/// A player backed by a [`Strategy`].
pub struct ComputerPlayer {
    color: StoneColor,
    strategy: Arc<dyn Strategy>,
    rng: Arc<Mutex<Rng>>,
    busy: Arc<AtomicBool>,
}

impl ComputerPlayer {
    /// `seed` fixes the strategy's random choices; `None` seeds from entropy.
    pub fn new(color: StoneColor, strategy: Arc<dyn Strategy>, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(Rng::new, Rng::with_seed);
        Self {
            color,
            strategy,
            rng: Arc::new(Mutex::new(rng)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn color(&self) -> StoneColor {
        self.color
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Whether a background computation is running.
    pub fn is_thinking(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Choose a move on the calling thread.
    pub fn select_move(&self, state: &GameState) -> Move {
        let mut rng = lock(&self.rng);
        compute(self.strategy.as_ref(), state, self.color, &mut rng)
    }

    /// Choose a move on a worker thread and hand it to `callback`.
    ///
    /// Works on a snapshot of `state`. Only one computation may be in
    /// flight; a second request fails with [`GoError::MovePending`].
    pub fn request_move(&self, state: &GameState, callback: MoveCallback) -> Result<()> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(GoError::MovePending);
        }

        let snapshot = state.clone();
        let strategy = Arc::clone(&self.strategy);
        let rng = Arc::clone(&self.rng);
        let busy = Arc::clone(&self.busy);
        let color = self.color;

        thread::spawn(move || {
            let mv = {
                let mut rng = lock(&rng);
                compute(strategy.as_ref(), &snapshot, color, &mut rng)
            };
            busy.store(false, Ordering::SeqCst);
            callback(mv);
        });
        Ok(())
    }
}

/// Run `strategy`, turning errors, panics and moves for the wrong color
/// into a pass.
fn compute(strategy: &dyn Strategy, state: &GameState, color: StoneColor, rng: &mut Rng) -> Move {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.select_move(state, color, rng)));
    match outcome {
        Ok(Ok(mv)) if mv.color() == color => {
            debug!(strategy = strategy.name(), mv = %mv.to_text(state.board().size()), "move selected");
            mv
        }
        Ok(Ok(mv)) => {
            warn!(strategy = strategy.name(), %color, played = %mv.color(), "move for the wrong color; passing");
            Move::Pass(color)
        }
        Ok(Err(e)) => {
            warn!(strategy = strategy.name(), error = %e, "move selection failed; passing");
            Move::Pass(color)
        }
        Err(_) => {
            warn!(strategy = strategy.name(), "move selection panicked; passing");
            Move::Pass(color)
        }
    }
}

/// Either kind of player.
pub enum Player {
    Human(HumanPlayer),
    Computer(ComputerPlayer),
}

impl Player {
    /// The player seated at `color` by `config`'s game mode.
    pub fn from_config(config: &Configuration, color: StoneColor) -> Self {
        match config.game_mode.computer_strength(color) {
            Some(strength) => {
                // Distinct streams for two computers sharing one seed.
                let seed = config
                    .ai_seed
                    .map(|s| s.wrapping_add(color.index() as u64));
                Player::Computer(ComputerPlayer::new(
                    color,
                    strategy::for_strength(strength, config.board_size),
                    seed,
                ))
            }
            None => Player::Human(HumanPlayer::new(color)),
        }
    }

    pub fn color(&self) -> StoneColor {
        match self {
            Player::Human(p) => p.color(),
            Player::Computer(p) => p.color(),
        }
    }

    pub fn is_computer(&self) -> bool {
        matches!(self, Player::Computer(_))
    }

    /// Ask for a move; `callback` receives exactly one.
    pub fn request_move(&self, state: &GameState, callback: MoveCallback) -> Result<()> {
        match self {
            Player::Human(p) => p.request_move(callback),
            Player::Computer(p) => p.request_move(state, callback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Coord;
    use crate::config::{GameMode, Strength};
    use std::sync::mpsc;
    use std::time::Duration;

    struct Failing;

    impl Strategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn select_move(&self, _: &GameState, _: StoneColor, _: &mut Rng) -> anyhow::Result<Move> {
            anyhow::bail!("no idea")
        }
    }

    struct Panicking;

    impl Strategy for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn select_move(&self, _: &GameState, _: StoneColor, _: &mut Rng) -> anyhow::Result<Move> {
            panic!("strategy bug")
        }
    }

    fn state() -> GameState {
        GameState::new(&Configuration::default())
    }

    #[test]
    fn test_human_provides_once() {
        let human = HumanPlayer::new(StoneColor::Black);
        assert!(!human.provide(Move::Pass(StoneColor::Black)));

        let (tx, rx) = mpsc::channel();
        human
            .request_move(Box::new(move |mv| tx.send(mv).unwrap()))
            .unwrap();
        assert!(human.is_waiting());
        assert_eq!(
            human.request_move(Box::new(|_| {})),
            Err(GoError::MovePending)
        );

        let mv = Move::place(Coord::new(2, 2), StoneColor::Black);
        assert!(human.provide(mv));
        assert_eq!(rx.recv().unwrap(), mv);
        assert!(!human.provide(mv));
    }

    #[test]
    fn test_failures_become_passes() {
        let gs = state();
        let failing = ComputerPlayer::new(StoneColor::Black, Arc::new(Failing), Some(1));
        assert_eq!(failing.select_move(&gs), Move::Pass(StoneColor::Black));

        let panicking = ComputerPlayer::new(StoneColor::Black, Arc::new(Panicking), Some(1));
        let (tx, rx) = mpsc::channel();
        panicking
            .request_move(&gs, Box::new(move |mv| tx.send(mv).unwrap()))
            .unwrap();
        let mv = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(mv, Move::Pass(StoneColor::Black));
    }

    #[test]
    fn test_from_config_seats_players() {
        let config = Configuration::default()
            .with_game_mode(GameMode::HumanVsComputer {
                strength: Strength::Beginner,
                computer_color: StoneColor::White,
            })
            .unwrap();
        let black = Player::from_config(&config, StoneColor::Black);
        let white = Player::from_config(&config, StoneColor::White);
        assert!(!black.is_computer());
        assert!(white.is_computer());
        assert_eq!(white.color(), StoneColor::White);
        match white {
            Player::Computer(p) => assert_eq!(p.strategy_name(), "random"),
            Player::Human(_) => unreachable!(),
        }
    }
}
