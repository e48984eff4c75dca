//! Checkers-MCTS: a checkers move generator and Monte Carlo Tree Search
//! engine.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and search parameters
//! - [`moves`] - Moves, squares and their notation
//! - [`board`] - Board state, legal moves with mandatory captures, move application
//! - [`difficulty`] - Difficulty presets (iteration budget, exploration constant)
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - Search tree with UCT selection and the move-choosing engine
//! - [`protocol`] - Text command loop for playing against the engine
//!
//! ## Example
//!
//! ```
//! use checkers_mcts::board::Board;
//! use checkers_mcts::difficulty::Difficulty;
//! use checkers_mcts::mcts::MctsEngine;
//!
//! let board = Board::new();
//! let legal = board.legal_moves(board.current_player());
//!
//! let mut engine = MctsEngine::with_seed(board, Difficulty::Easy, 42);
//! let best = engine.choose_move(&legal).unwrap();
//! assert!(legal.contains(&best));
//! println!("Best move: {best}");
//! ```

pub mod board;
pub mod constants;
pub mod difficulty;
pub mod mcts;
pub mod moves;
pub mod playout;
pub mod protocol;
