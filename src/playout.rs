//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays uniformly random legal moves on a private copy of the
//! board until the side to move is stuck or [`ROLLOUT_PLY_CAP`] plies have
//! been played, then scores the material balance.

use crate::board::{Board, Player};
use crate::constants::{DRAW, LOSS, ROLLOUT_PLY_CAP, WIN};
use crate::moves::Move;

/// Map a material differential to a rollout value: [`WIN`] when ahead,
/// [`LOSS`] when behind, [`DRAW`] when level.
pub fn outcome(differential: f64) -> f64 {
    if differential > 0.0 {
        WIN
    } else if differential < 0.0 {
        LOSS
    } else {
        DRAW
    }
}

/// Score `board` for `perspective` as a rollout value.
pub fn score(board: &Board, perspective: Player) -> f64 {
    outcome(board.reward_for(perspective))
}

/// Pick a uniformly random legal move for the side to move.
pub fn random_move(board: &Board, rng: &mut fastrand::Rng) -> Option<Move> {
    let mut moves = board.legal_moves(board.current_player());
    if moves.is_empty() {
        return None;
    }
    let i = rng.usize(..moves.len());
    Some(moves.swap_remove(i))
}

/// Play random moves on a copy of `board` until the side to move is stuck or
/// [`ROLLOUT_PLY_CAP`] plies have been played.
///
/// Returns the final board and the number of plies played.
pub fn playout(board: &Board, rng: &mut fastrand::Rng) -> (Board, usize) {
    let mut sim = board.clone();
    let mut plies = 0;

    while plies < ROLLOUT_PLY_CAP {
        let Some(mv) = random_move(&sim, rng) else {
            break;
        };
        if let Err(err) = sim.apply_move(&mv) {
            log::warn!("rollout stopped on unplayable move {mv}: {err}");
            break;
        }
        plies += 1;
    }

    (sim, plies)
}

/// Perform a random playout from `board` and score it for `perspective`.
///
/// The board is not modified.
pub fn rollout(board: &Board, perspective: Player, rng: &mut fastrand::Rng) -> f64 {
    let (end, _) = playout(board, rng);
    score(&end, perspective)
}
