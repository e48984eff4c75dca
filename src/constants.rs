//! Constants for board geometry and search parameters.
//!
//! Difficulty-dependent values (iteration budget, exploration constant) live
//! in [`crate::difficulty`]; everything here is fixed for every search.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Checkers is played on the 64 squares of a chessboard.
pub const N: usize = 8;

/// Number of rows each side fills at the start of a game.
pub const HOME_ROWS: usize = 3;

/// Row Red must reach to crown a man.
pub const RED_CROWN_ROW: usize = 0;

/// Row Black must reach to crown a man.
pub const BLACK_CROWN_ROW: usize = N - 1;

/// File letters used in move notation, left to right.
pub const FILES: &[u8; N] = b"abcdefgh";

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Maximum number of plies played in a single rollout.
pub const ROLLOUT_PLY_CAP: usize = 20;

/// Rollout value when the engine side ends ahead on material.
pub const WIN: f64 = 1.0;

/// Rollout value when material is level.
pub const DRAW: f64 = 0.5;

/// Rollout value when the engine side ends behind on material.
pub const LOSS: f64 = 0.0;

/// Progress report period (number of iterations between debug reports).
pub const REPORT_PERIOD: usize = 200;

// =============================================================================
// Self-play
// =============================================================================

/// Ply limit for engine-vs-engine demo games.
pub const MAX_GAME_LEN: usize = 200;
