//! Constants for board geometry, move generation, evaluation weights and clocks.
//!
//! Board size is chosen at runtime from the game configuration, so this
//! module only holds the set of sizes the engine accepts and the tuning
//! parameters shared by the rules engine and the computer players.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board sizes accepted by [`Configuration`](crate::config::Configuration).
pub const BOARD_SIZES: [usize; 4] = [4, 9, 13, 19];

/// Orthogonal neighbor offsets (row, col). Order: North, South, West, East.
pub const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Diagonal neighbor offsets (row, col). Order: NW, NE, SW, SE.
pub const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

// =============================================================================
// Candidate Generation
// =============================================================================

/// Largest board that still uses the wide candidate radius.
pub const SMALL_BOARD_MAX: usize = 9;

/// Candidate radius around existing stones on boards up to 9x9.
pub const CANDIDATE_RADIUS_SMALL: usize = 2;

/// Candidate radius around existing stones on larger boards.
pub const CANDIDATE_RADIUS_LARGE: usize = 1;

/// Distance of the star points from the edge used for the opening fallback.
pub const STAR_POINT_LINE: usize = 3;

// =============================================================================
// Heuristic Move Scoring
// =============================================================================

/// Bonus per captured stone (largest single factor).
pub const CAPTURE_SCORE: i32 = 1000;

/// Bonus for lifting one of our own groups out of atari.
pub const SAVE_ATARI_SCORE: i32 = 900;

/// Bonus for reducing an opponent group to a single liberty.
pub const CREATE_ATARI_SCORE: i32 = 200;

/// Bonus per opponent connection the move sits between.
pub const CUT_OPPONENT_SCORE: i32 = 150;

/// Bonus per liberty gained by the group the stone joins.
pub const EXPAND_LIBERTY_SCORE: i32 = 50;

/// Bonus per adjacent friendly stone.
pub const CONNECT_OWN_SCORE: i32 = 20;

/// Bonus for playing near the center.
pub const CENTER_BIAS_SCORE: i32 = 5;

/// Penalty for putting the new group in atari without capturing or saving.
pub const SELF_ATARI_PENALTY: i32 = -800;

/// Penalty for filling one of our own true eyes.
pub const FILL_EYE_PENALTY: i32 = -2000;

/// Below this best score, a computer player answers a pass with a pass.
pub const PASS_THRESHOLD: i32 = 100;

/// Jitter added to heuristic scores, drawn from `-JITTER..=JITTER`.
pub const JITTER: i32 = 1;

// =============================================================================
// Alpha-Beta Search
// =============================================================================

/// Default search depth in plies.
pub const DEFAULT_SEARCH_DEPTH: u8 = 2;

/// Maximum number of placements examined at each node (after ordering).
pub const MAX_SEARCH_BREADTH: usize = 30;

/// Search breadth on boards larger than 9x9.
pub const LARGE_BOARD_SEARCH_BREADTH: usize = 20;

/// Leaf weight for the prisoner differential.
pub const EVAL_CAPTURE_WEIGHT: i64 = 15;

/// Leaf weight for the liberty differential.
pub const EVAL_LIBERTY_WEIGHT: i64 = 1;

/// Leaf penalty per own group in atari.
pub const EVAL_ATARI_PENALTY: i64 = 50;

/// Leaf bonus per opponent group in atari.
pub const EVAL_ATARI_BONUS: i64 = 40;

/// Leaf bonus per group that looks alive (two eyes or many liberties).
pub const EVAL_ALIVE_BONUS: i64 = 100;

/// Liberties at which a group counts as alive for evaluation.
pub const EVAL_ALIVE_LIBERTIES: usize = 4;

/// Leaf weight for the territory differential.
pub const EVAL_TERRITORY_WEIGHT: i64 = 10;

/// Value of a finished game, before the score margin is added.
pub const TERMINAL_VALUE: i64 = 1_000_000;

/// Ordering bonus for a pass per consecutive pass already played.
pub const PASS_ORDER_BONUS: i32 = 50;

// =============================================================================
// Monte-Carlo Playouts
// =============================================================================

/// Default number of playouts per candidate.
pub const DEFAULT_PLAYOUTS: usize = 24;

/// Number of heuristic candidates handed to the playouts.
pub const MONTE_CARLO_CANDIDATES: usize = 8;

/// Playouts per candidate on boards larger than 9x9.
pub const LARGE_BOARD_PLAYOUTS: usize = 8;

/// Heuristic candidates handed to the playouts on boards larger than 9x9.
pub const LARGE_BOARD_CANDIDATES: usize = 4;

/// Playout length limit as a multiple of the board area.
pub const PLAYOUT_LENGTH_FACTOR: usize = 3;

// =============================================================================
// Configuration Defaults
// =============================================================================

/// Default board size.
pub const DEFAULT_BOARD_SIZE: usize = 9;

/// Default komi.
pub const DEFAULT_KOMI: f32 = 6.5;

/// Largest komi accepted.
pub const MAX_KOMI: f32 = 50.0;

/// Default main time per player, in seconds (30 minutes).
pub const DEFAULT_TIME_BUDGET_SECS: u64 = 30 * 60;

/// Moves that must be completed in each Canadian overtime period.
pub const DEFAULT_CANADIAN_MOVES: u32 = 25;

/// Length of a Canadian overtime period, in seconds.
pub const DEFAULT_CANADIAN_PERIOD_SECS: u64 = 5 * 60;
