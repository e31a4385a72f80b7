//! Mailbox board: which piece, if any, stands on each square.

use crate::SquareSet;
use chess_core::{Color, Piece, Square};

/// Piece placement for both sides.
///
/// Each of the 64 cells holds at most one piece. A [`SquareSet`] per side is
/// kept in step with the cells so a side's pieces can be enumerated without
/// scanning the whole board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<(Piece, Color)>; 64],
    occupancy: [SquareSet; 2],
}

impl Board {
    /// Creates a board with no pieces.
    pub const fn empty() -> Self {
        Board {
            squares: [None; 64],
            occupancy: [SquareSet::EMPTY; 2],
        }
    }

    /// Returns the piece and color on `sq`, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        self.squares[sq.index() as usize]
    }

    /// Returns the color of the piece on `sq`, if any.
    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|(_, color)| color)
    }

    /// Returns true if no piece stands on `sq`.
    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.index() as usize].is_none()
    }

    /// Squares occupied by `color`.
    #[inline]
    pub fn occupied_by(&self, color: Color) -> SquareSet {
        self.occupancy[color.index()]
    }

    /// Squares occupied by either side.
    #[inline]
    pub fn occupied(&self) -> SquareSet {
        self.occupancy[0] | self.occupancy[1]
    }

    /// Returns true if `sq` holds exactly this piece.
    #[inline]
    pub fn has(&self, sq: Square, piece: Piece, color: Color) -> bool {
        self.piece_at(sq) == Some((piece, color))
    }

    /// Places a piece on an empty square.
    ///
    /// # Panics
    ///
    /// Panics if `sq` is already occupied.
    pub fn put(&mut self, sq: Square, piece: Piece, color: Color) {
        let cell = &mut self.squares[sq.index() as usize];
        if let Some((other, other_color)) = *cell {
            panic!(
                "cannot place {} {} on {}: occupied by {} {}",
                color, piece, sq, other_color, other
            );
        }
        *cell = Some((piece, color));
        self.occupancy[color.index()].insert(sq);
    }

    /// Removes and returns the piece on `sq`.
    ///
    /// # Panics
    ///
    /// Panics if `sq` is empty.
    pub fn take(&mut self, sq: Square) -> (Piece, Color) {
        let Some((piece, color)) = self.squares[sq.index() as usize].take() else {
            panic!("cannot take from {}: square is empty", sq);
        };
        self.occupancy[color.index()].remove(sq);
        (piece, color)
    }

    /// Iterates over the pieces of `color` as `(square, piece)` pairs.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied_by(color)
            .iter()
            .filter_map(move |sq| self.piece_at(sq).map(|(piece, _)| (sq, piece)))
    }

    /// Number of pieces of this kind and color.
    pub fn count(&self, piece: Piece, color: Color) -> usize {
        self.pieces(color).filter(|&(_, p)| p == piece).count()
    }

    /// Returns the square of `color`'s king.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|&(_, piece)| piece == Piece::King)
            .map(|(sq, _)| sq)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn put_and_take_keep_index_in_sync() {
        let mut board = Board::empty();
        board.put(sq("e1"), Piece::King, Color::White);
        board.put(sq("d8"), Piece::Queen, Color::Black);

        assert_eq!(board.piece_at(sq("e1")), Some((Piece::King, Color::White)));
        assert_eq!(board.color_at(sq("d8")), Some(Color::Black));
        assert!(board.is_empty(sq("e2")));
        assert_eq!(board.occupied().len(), 2);
        assert!(board.occupied_by(Color::Black).contains(sq("d8")));

        assert_eq!(board.take(sq("d8")), (Piece::Queen, Color::Black));
        assert!(board.occupied_by(Color::Black).is_empty());
        assert!(board.is_empty(sq("d8")));
    }

    #[test]
    fn king_square_and_counts() {
        let mut board = Board::empty();
        board.put(sq("g8"), Piece::King, Color::Black);
        board.put(sq("a7"), Piece::Pawn, Color::Black);
        board.put(sq("b7"), Piece::Pawn, Color::Black);

        assert_eq!(board.king_square(Color::Black), Some(sq("g8")));
        assert_eq!(board.king_square(Color::White), None);
        assert_eq!(board.count(Piece::Pawn, Color::Black), 2);
        assert_eq!(board.pieces(Color::Black).count(), 3);
    }

    #[test]
    #[should_panic(expected = "occupied")]
    fn put_on_occupied_square_panics() {
        let mut board = Board::empty();
        board.put(sq("e4"), Piece::Pawn, Color::White);
        board.put(sq("e4"), Piece::Knight, Color::Black);
    }

    #[test]
    #[should_panic(expected = "square is empty")]
    fn take_from_empty_square_panics() {
        let mut board = Board::empty();
        board.take(sq("e4"));
    }
}
