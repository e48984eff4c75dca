//! Checkers moves and their text notation.
//!
//! A [`Move`] is the ordered list of squares a piece visits. Two squares make
//! a simple diagonal step; more than two make a capture chain where every
//! consecutive pair is a two-square jump.
//!
//! Notation follows the board rendering: files `a`..`h` left to right and
//! ranks `8`..`1` top to bottom, so row 0 is rank 8. Steps are written
//! `c3-d4`, chains `e3xc5xa7`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{FILES, N};

/// A square on the board as `(row, col)`, row 0 at the top.
pub type Square = (usize, usize);

/// Reasons a move is rejected before it touches the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("a move needs at least two squares")]
    TooShort,
    #[error("square ({0}, {1}) is off the board")]
    OutOfBounds(usize, usize),
    #[error("no piece on {0}")]
    EmptyOrigin(String),
    #[error("the piece on {0} belongs to the side not to move")]
    NotYourPiece(String),
    #[error("destination {0} is not empty")]
    Occupied(String),
    #[error("{0} to {1} is not a diagonal step or jump")]
    NotDiagonal(String, String),
    #[error("{0} to {1} moves a man backwards")]
    WrongDirection(String, String),
    #[error("{0} to {1} is a plain step inside a capture chain")]
    StepInChain(String, String),
    #[error("nothing to capture between {0} and {1}")]
    NothingToCapture(String, String),
    #[error("cannot parse move notation {0:?}")]
    Notation(String),
}

/// Return whether `(row, col)` lies on the board.
#[inline]
pub const fn in_bounds(row: isize, col: isize) -> bool {
    row >= 0 && row < N as isize && col >= 0 && col < N as isize
}

/// Format a square in algebraic notation, e.g. `(5, 2)` is `c3`.
pub fn str_square((row, col): Square) -> String {
    if row >= N || col >= N {
        return format!("({row},{col})");
    }
    format!("{}{}", FILES[col] as char, N - row)
}

/// Parse a square in algebraic notation (case-insensitive).
pub fn parse_square(s: &str) -> Option<Square> {
    let bytes = s.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let col = FILES.iter().position(|&f| f == bytes[0].to_ascii_lowercase())?;
    let rank = (bytes[1] as char).to_digit(10)? as usize;
    if rank == 0 || rank > N {
        return None;
    }
    Some((N - rank, col))
}

/// An immutable sequence of squares describing one turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    squares: Vec<Square>,
}

impl Move {
    /// Build a move from the squares it visits.
    pub fn new(squares: Vec<Square>) -> Result<Self, MoveError> {
        if squares.len() < 2 {
            return Err(MoveError::TooShort);
        }
        if let Some(&(row, col)) = squares.iter().find(|&&(r, c)| r >= N || c >= N) {
            return Err(MoveError::OutOfBounds(row, col));
        }
        Ok(Self { squares })
    }

    /// Wrap a path produced by move generation, which is on the board and at
    /// least two squares long by construction.
    pub(crate) fn from_path_unchecked(squares: Vec<Square>) -> Self {
        debug_assert!(squares.len() >= 2);
        Self { squares }
    }

    /// A single step (or single jump) from `from` to `to`.
    pub fn step(from: Square, to: Square) -> Result<Self, MoveError> {
        Self::new(vec![from, to])
    }

    /// Every square visited, origin first.
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Origin square.
    pub fn from(&self) -> Square {
        self.squares[0]
    }

    /// Final landing square.
    pub fn to(&self) -> Square {
        self.squares[self.squares.len() - 1]
    }

    /// True when the move jumps over at least one piece.
    ///
    /// A two-square move is a capture when its squares are two rows apart.
    pub fn is_capture(&self) -> bool {
        self.squares.len() > 2 || self.from().0.abs_diff(self.to().0) == 2
    }

    /// Squares of the pieces jumped over, in order.
    pub fn captured(&self) -> Vec<Square> {
        self.squares
            .windows(2)
            .filter(|w| w[0].0.abs_diff(w[1].0) == 2)
            .map(|w| ((w[0].0 + w[1].0) / 2, (w[0].1 + w[1].1) / 2))
            .collect()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture() { 'x' } else { '-' };
        for (i, &sq) in self.squares.iter().enumerate() {
            if i > 0 {
                write!(f, "{sep}")?;
            }
            write!(f, "{}", str_square(sq))?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squares = s
            .trim()
            .split(['-', 'x', 'X'])
            .map(|part| parse_square(part).ok_or_else(|| MoveError::Notation(s.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(squares)
    }
}
