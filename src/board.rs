//! Checkers board state and move generation.
//!
//! This module provides the core game logic:
//! - An 8x8 grid of pieces plus the player to move
//! - Legal move generation under the mandatory-capture rule
//! - Capture-chain discovery by depth-first search
//! - Move application with captures and crowning
//!
//! Red moves first and advances toward row 0; Black advances toward row 7.

use std::fmt;

use crate::constants::{BLACK_CROWN_ROW, HOME_ROWS, N, RED_CROWN_ROW};
use crate::moves::{in_bounds, str_square, Move, MoveError, Square};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Red,
    Black,
}

impl Player {
    /// The other player.
    pub const fn opponent(self) -> Self {
        match self {
            Player::Red => Player::Black,
            Player::Black => Player::Red,
        }
    }

    /// Row on which this player's men are crowned.
    pub const fn crown_row(self) -> usize {
        match self {
            Player::Red => RED_CROWN_ROW,
            Player::Black => BLACK_CROWN_ROW,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Red => write!(f, "red"),
            Player::Black => write!(f, "black"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Piece {
    Man(Player),
    King(Player),
}

impl Piece {
    /// The player this piece belongs to.
    pub const fn owner(self) -> Player {
        match self {
            Piece::Man(p) | Piece::King(p) => p,
        }
    }

    /// Row directions this piece may move or jump in.
    fn row_directions(self) -> &'static [isize] {
        match self {
            Piece::Man(Player::Red) => &[-1],
            Piece::Man(Player::Black) => &[1],
            Piece::King(_) => &[-1, 1],
        }
    }

    /// The piece after landing on `row`: men on their crown row become kings.
    const fn landed_on(self, row: usize) -> Self {
        match self {
            Piece::Man(p) if row == p.crown_row() => Piece::King(p),
            other => other,
        }
    }

    const fn symbol(self) -> char {
        match self {
            Piece::Man(Player::Red) => 'r',
            Piece::King(Player::Red) => 'R',
            Piece::Man(Player::Black) => 'b',
            Piece::King(Player::Black) => 'B',
        }
    }
}

/// A checkers position: the grid and the player to move.
///
/// The grid is a plain array, so [`Clone`] yields a fully independent board.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Option<Piece>; N]; N],
    current: Player,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard opening layout with Red to move.
    pub fn new() -> Self {
        let mut board = Self::empty(Player::Red);
        for row in 0..N {
            for col in 0..N {
                if !is_dark(row, col) {
                    continue;
                }
                if row < HOME_ROWS {
                    board.cells[row][col] = Some(Piece::Man(Player::Black));
                } else if row >= N - HOME_ROWS {
                    board.cells[row][col] = Some(Piece::Man(Player::Red));
                }
            }
        }
        board
    }

    /// A board with no pieces.
    pub fn empty(to_move: Player) -> Self {
        Self {
            cells: [[None; N]; N],
            current: to_move,
        }
    }

    /// The piece on a square, `None` when empty or off the board.
    pub fn get(&self, (row, col): Square) -> Option<Piece> {
        if row >= N || col >= N {
            return None;
        }
        self.cells[row][col]
    }

    /// Place or clear a square directly, bypassing the rules. Used to set up
    /// positions.
    pub fn set(&mut self, (row, col): Square, piece: Option<Piece>) -> Result<(), MoveError> {
        if row >= N || col >= N {
            return Err(MoveError::OutOfBounds(row, col));
        }
        self.cells[row][col] = piece;
        Ok(())
    }

    /// The player to move.
    pub const fn current_player(&self) -> Player {
        self.current
    }

    /// Hand the move to `player` without playing anything.
    pub fn set_current_player(&mut self, player: Player) {
        self.current = player;
    }

    /// Number of pieces (men and kings) owned by `player`.
    pub fn piece_count(&self, player: Player) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_some_and(|p| p.owner() == player))
            .count()
    }

    /// Material differential from `player`'s perspective.
    pub fn reward_for(&self, player: Player) -> f64 {
        self.piece_count(player) as f64 - self.piece_count(player.opponent()) as f64
    }

    /// Material differential from the perspective of the player to move.
    pub fn reward(&self) -> f64 {
        self.reward_for(self.current)
    }

    /// True when neither side has a legal move.
    pub fn is_terminal(&self) -> bool {
        self.legal_moves(Player::Red).is_empty() && self.legal_moves(Player::Black).is_empty()
    }

    /// Generate the legal moves for `player`.
    ///
    /// If any piece can capture, only capture chains are returned. An empty
    /// result means `player` cannot move.
    pub fn legal_moves(&self, player: Player) -> Vec<Move> {
        let mut captures = Vec::new();
        let mut steps = Vec::new();

        for row in 0..N {
            for col in 0..N {
                let Some(piece) = self.cells[row][col] else {
                    continue;
                };
                if piece.owner() != player {
                    continue;
                }

                let mut path = vec![(row, col)];
                self.collect_jumps(player, (row, col), &mut path, &mut captures);

                if captures.is_empty() {
                    self.collect_steps(piece, (row, col), &mut steps);
                }
            }
        }

        if captures.is_empty() { steps } else { captures }
    }

    /// Simple diagonal steps onto empty squares.
    fn collect_steps(&self, piece: Piece, (row, col): Square, out: &mut Vec<Move>) {
        for &dr in piece.row_directions() {
            for dc in [1, -1] {
                let (r, c) = (row as isize + dr, col as isize + dc);
                if !in_bounds(r, c) {
                    continue;
                }
                let to = (r as usize, c as usize);
                if self.get(to).is_none() {
                    out.push(Move::from_path_unchecked(vec![(row, col), to]));
                }
            }
        }
    }

    /// Depth-first search for capture chains starting at `from`.
    ///
    /// Every jump is played on a fresh copy of the board, so sibling branches
    /// always see the position before the jump. A branch that cannot jump any
    /// further yields the chain accumulated in `path`.
    fn collect_jumps(
        &self,
        player: Player,
        from: Square,
        path: &mut Vec<Square>,
        out: &mut Vec<Move>,
    ) {
        let Some(piece) = self.get(from) else {
            return;
        };

        let mut extended = false;
        for &dr in piece.row_directions() {
            for dc in [-1, 1] {
                let Some((mid, to)) = self.jump_target(player, from, dr, dc) else {
                    continue;
                };
                extended = true;

                let mut next = self.clone();
                next.cells[from.0][from.1] = None;
                next.cells[mid.0][mid.1] = None;
                next.cells[to.0][to.1] = Some(piece.landed_on(to.0));

                path.push(to);
                next.collect_jumps(player, to, path, out);
                path.pop();
            }
        }

        if !extended && path.len() > 1 {
            out.push(Move::from_path_unchecked(path.clone()));
        }
    }

    /// The captured square and landing square of a jump in direction
    /// `(dr, dc)`, if the jump is possible.
    fn jump_target(
        &self,
        player: Player,
        (row, col): Square,
        dr: isize,
        dc: isize,
    ) -> Option<(Square, Square)> {
        let (r, c) = (row as isize + 2 * dr, col as isize + 2 * dc);
        if !in_bounds(r, c) {
            return None;
        }
        let to = (r as usize, c as usize);
        let mid = ((row as isize + dr) as usize, (col as isize + dc) as usize);
        if self.get(to).is_some() {
            return None;
        }
        match self.get(mid) {
            Some(p) if p.owner() == player.opponent() => Some((mid, to)),
            _ => None,
        }
    }

    /// Play `mv`, removing every jumped piece, crowning on the back rank and
    /// passing the turn.
    ///
    /// The move is checked square by square on a scratch copy; on any error
    /// the board is left untouched.
    pub fn apply_move(&mut self, mv: &Move) -> Result<(), MoveError> {
        let chain = mv.squares().len() > 2;
        let mut next = self.clone();
        for pair in mv.squares().windows(2) {
            next.apply_step(pair[0], pair[1], chain)?;
        }
        next.current = next.current.opponent();
        *self = next;
        Ok(())
    }

    fn apply_step(&mut self, from: Square, to: Square, chain: bool) -> Result<(), MoveError> {
        for (row, col) in [from, to] {
            if row >= N || col >= N {
                return Err(MoveError::OutOfBounds(row, col));
            }
        }
        let piece = self
            .get(from)
            .ok_or_else(|| MoveError::EmptyOrigin(str_square(from)))?;
        if piece.owner() != self.current {
            return Err(MoveError::NotYourPiece(str_square(from)));
        }
        if self.get(to).is_some() {
            return Err(MoveError::Occupied(str_square(to)));
        }

        let rows = from.0.abs_diff(to.0);
        let cols = from.1.abs_diff(to.1);
        if rows != cols || !(1..=2).contains(&rows) {
            return Err(MoveError::NotDiagonal(str_square(from), str_square(to)));
        }
        // `piece` is as it stands now, so a man crowned earlier in the chain
        // may already jump back.
        let dr = if to.0 < from.0 { -1 } else { 1 };
        if !piece.row_directions().contains(&dr) {
            return Err(MoveError::WrongDirection(str_square(from), str_square(to)));
        }
        if chain && rows == 1 {
            return Err(MoveError::StepInChain(str_square(from), str_square(to)));
        }
        if rows == 2 {
            let mid = ((from.0 + to.0) / 2, (from.1 + to.1) / 2);
            match self.get(mid) {
                Some(p) if p.owner() != piece.owner() => self.cells[mid.0][mid.1] = None,
                _ => return Err(MoveError::NothingToCapture(str_square(from), str_square(to))),
            }
        }

        self.cells[from.0][from.1] = None;
        self.cells[to.0][to.1] = Some(piece.landed_on(to.0));
        Ok(())
    }
}

/// Pieces only ever stand on dark squares.
pub const fn is_dark(row: usize, col: usize) -> bool {
    (row + col) % 2 == 1
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..N {
            write!(f, "{} ", N - row)?;
            for col in 0..N {
                let ch = match self.cells[row][col] {
                    Some(piece) => piece.symbol(),
                    None if is_dark(row, col) => '.',
                    None => ' ',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{} to move", self.current)
    }
}
