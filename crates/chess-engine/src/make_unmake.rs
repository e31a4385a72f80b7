//! Applying and reverting moves in place.

use crate::movegen::is_king_attacked;
use crate::position::castling_rook_squares;
use crate::{CastlingRights, Position};
use chess_core::{Color, Move, Piece, Square};

/// Everything [`Position::unmake_move`] needs to restore the position a move
/// was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    moved: Piece,
    mover: Color,
    captured: Option<(Piece, Color, Square)>,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    side_to_move: Color,
    checked: [bool; 2],
}

impl Undo {
    /// The piece removed by the move, if any.
    pub fn captured(&self) -> Option<(Piece, Color)> {
        self.captured.map(|(piece, color, _)| (piece, color))
    }

    /// The square the captured piece stood on. Differs from the destination
    /// only for en passant.
    pub fn captured_square(&self) -> Option<Square> {
        self.captured.map(|(_, _, sq)| sq)
    }

    /// Kind of the piece that left the origin square.
    pub fn moved(&self) -> Piece {
        self.moved
    }
}

/// Signed file and rank distance from `from` to `to`.
fn deltas(from: Square, to: Square) -> (i8, i8) {
    (
        to.file_index() as i8 - from.file_index() as i8,
        to.rank_index() as i8 - from.rank_index() as i8,
    )
}

impl Position {
    /// Applies `m` in place and returns the record needed to revert it.
    ///
    /// The move must be pseudo-legal for the piece on its origin; the side to
    /// move is not consulted, so the legality filter can probe either side.
    /// A pawn reaching the last rank becomes the requested promotion piece,
    /// or a queen when none (or an invalid one) was requested.
    ///
    /// # Panics
    ///
    /// Panics if the origin is empty or the destination holds a piece of the
    /// mover's own color.
    pub fn make_move(&mut self, m: Move) -> Undo {
        let (from, to) = (m.from(), m.to());
        let Some((piece, color)) = self.board.piece_at(from) else {
            panic!("make_move {}: no piece on {}", m, from);
        };

        let mut undo = Undo {
            moved: piece,
            mover: color,
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            side_to_move: self.side_to_move,
            checked: self.checked,
        };

        if let Some((victim, victim_color)) = self.board.piece_at(to) {
            assert!(
                victim_color != color,
                "make_move {}: {} cannot capture its own {}",
                m,
                color,
                victim
            );
            debug_assert!(victim != Piece::King, "make_move {}: captures a king", m);
            self.board.take(to);
            undo.captured = Some((victim, victim_color, to));
            self.castling.remove_for_square(to);
        }

        let (file_delta, rank_delta) = deltas(from, to);

        if piece == Piece::Pawn
            && file_delta != 0
            && undo.captured.is_none()
            && undo.en_passant == Some(to)
        {
            // The captured pawn sits beside the origin, on the destination file.
            if let Some(victim_sq) = Square::from_coords(to.file_index(), from.rank_index()) {
                let (victim, victim_color) = self.board.take(victim_sq);
                undo.captured = Some((victim, victim_color, victim_sq));
            }
        }

        self.en_passant = if piece == Piece::Pawn && rank_delta.abs() == 2 {
            from.offset(0, rank_delta / 2)
        } else {
            None
        };

        self.board.take(from);
        let placed = if piece == Piece::Pawn && to.rank_index() == color.promotion_rank() {
            m.promotion()
                .filter(|p| p.is_promotion_target())
                .unwrap_or(Piece::Queen)
        } else {
            piece
        };
        self.board.put(to, placed, color);

        match piece {
            Piece::King => {
                if file_delta.abs() == 2 {
                    let (rook_from, rook_to) = castling_rook_squares(color, file_delta > 0);
                    let (rook, rook_color) = self.board.take(rook_from);
                    self.board.put(rook_to, rook, rook_color);
                }
                self.castling.remove_color(color);
            }
            Piece::Rook => self.castling.remove_for_square(from),
            _ => {}
        }

        if piece == Piece::Pawn || undo.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if color == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = color.opposite();

        let opponent = color.opposite();
        self.checked[opponent.index()] = is_king_attacked(&self.board, opponent);
        self.checked[color.index()] = false;

        undo
    }

    /// Reverts `m`, which must be the last move applied with
    /// [`make_move`](Position::make_move), using its [`Undo`] record.
    ///
    /// # Panics
    ///
    /// Panics if the board does not match what applying `m` would have left.
    pub fn unmake_move(&mut self, m: Move, undo: Undo) {
        let (from, to) = (m.from(), m.to());
        let (placed, color) = self.board.take(to);
        assert!(
            color == undo.mover,
            "unmake_move {}: expected a {} piece on {}, found {}",
            m,
            undo.mover,
            to,
            color
        );
        assert!(
            placed == undo.moved || (undo.moved == Piece::Pawn && placed.is_promotion_target()),
            "unmake_move {}: expected {} on {}, found {}",
            m,
            undo.moved,
            to,
            placed
        );

        let (file_delta, _) = deltas(from, to);
        if undo.moved == Piece::King && file_delta.abs() == 2 {
            let (rook_from, rook_to) = castling_rook_squares(color, file_delta > 0);
            let rook = self.board.take(rook_to);
            assert!(
                rook == (Piece::Rook, color),
                "unmake_move {}: castled rook missing from {}",
                m,
                rook_to
            );
            self.board.put(rook_from, Piece::Rook, color);
        }

        self.board.put(from, undo.moved, color);
        if let Some((victim, victim_color, sq)) = undo.captured {
            self.board.put(sq, victim, victim_color);
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.side_to_move = undo.side_to_move;
        self.checked = undo.checked;
    }
}
