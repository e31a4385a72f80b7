//! Chess rules engine on a mailbox board.
//!
//! This crate provides:
//! - [`Board`] - square-to-piece mapping with a per-side [`SquareSet`] index
//! - [`Position`] - board plus side to move, castling rights, en passant target, and clocks
//! - Move generation and legality filtering in [`movegen`]
//! - In-place [`Position::make_move`] / [`Position::unmake_move`] with an [`Undo`] record
//! - [`RuleSet`] and [`GameStatus`] for checkmate and stalemate detection
//! - [`Game`] - turn driver with move validation and take-back history
//!
//! # Example
//!
//! ```
//! use chess_engine::{Game, GameStatus};
//!
//! let mut game = Game::new();
//! for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
//!     game.make_move_uci(uci).unwrap();
//! }
//! assert_eq!(game.status(), GameStatus::Checkmate { winner: chess_core::Color::Black });
//! println!("Final position: {}", game.to_fen());
//! ```

mod board;
mod game;
mod make_unmake;
pub mod movegen;
mod position;
pub mod rules;
mod squareset;

pub use board::Board;
pub use game::{Game, GameError, GameMove};
pub use make_unmake::Undo;
pub use movegen::{
    attacks_from, generate_moves, has_legal_move, is_king_attacked, is_legal,
    is_square_attacked, legal_destinations, legal_moves, legal_moves_for,
    pseudo_legal_destinations, MoveList,
};
pub use position::{CastlingRights, Position};
pub use rules::{GameStatus, RuleSet, StandardChess};
pub use squareset::{SquareSet, SquareSetIter};
