//! Rule set abstraction and game status.
//!
//! The [`RuleSet`] trait is the seam between game management and the
//! generators. [`StandardChess`] is the only rule set shipped.

mod standard;

pub use standard::StandardChess;

use crate::{MoveList, Position};
use chess_core::{Color, Move};
use std::fmt;

/// Whether play can continue, and if not, how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// The side to move has at least one legal move.
    Ongoing,
    /// The side to move is in check and has no legal move.
    Checkmate {
        /// The side that delivered mate.
        winner: Color,
    },
    /// The side to move is not in check and has no legal move.
    Stalemate,
}

impl GameStatus {
    /// Returns true for checkmate and stalemate.
    pub const fn is_over(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }

    /// The winning side, if the game ended in checkmate.
    pub const fn winner(self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => write!(f, "ongoing"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            GameStatus::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// Trait for a set of chess rules.
///
/// # Example
///
/// ```
/// use chess_engine::rules::{GameStatus, RuleSet, StandardChess};
///
/// let position = StandardChess.initial_position();
/// assert_eq!(StandardChess.generate_moves(&position).len(), 20);
/// assert_eq!(StandardChess.status(&position), GameStatus::Ongoing);
/// ```
pub trait RuleSet {
    /// Returns the initial position for this rule set.
    fn initial_position(&self) -> Position;

    /// Generates all legal moves for the side to move.
    fn generate_moves(&self, position: &Position) -> MoveList;

    /// Returns true if the given move is legal in the position.
    fn is_legal(&self, position: &Position, m: Move) -> bool;

    /// Returns true if the side to move is in check.
    fn is_check(&self, position: &Position) -> bool;

    /// Classifies the position for the side to move.
    fn status(&self, position: &Position) -> GameStatus;

    /// Returns true if the game is over.
    fn is_game_over(&self, position: &Position) -> bool {
        self.status(position).is_over()
    }
}
