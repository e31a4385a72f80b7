//! Standard chess rules implementation.

use super::{GameStatus, RuleSet};
use crate::movegen::{generate_moves, has_legal_move, is_king_attacked, is_legal};
use crate::{MoveList, Position};
use chess_core::Move;

/// Standard chess rules: full piece movement, castling, en passant,
/// promotion, and checkmate and stalemate detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl RuleSet for StandardChess {
    fn initial_position(&self) -> Position {
        Position::startpos()
    }

    fn generate_moves(&self, position: &Position) -> MoveList {
        generate_moves(position)
    }

    fn is_legal(&self, position: &Position, m: Move) -> bool {
        position.piece_at(m.from()).map(|(_, color)| color) == Some(position.side_to_move)
            && is_legal(position, m)
    }

    fn is_check(&self, position: &Position) -> bool {
        is_king_attacked(&position.board, position.side_to_move)
    }

    fn status(&self, position: &Position) -> GameStatus {
        let side = position.side_to_move;
        if has_legal_move(position, side) {
            GameStatus::Ongoing
        } else if self.is_check(position) {
            GameStatus::Checkmate {
                winner: side.opposite(),
            }
        } else {
            GameStatus::Stalemate
        }
    }
}
