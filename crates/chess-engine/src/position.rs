//! Chess position representation.

use chess_core::{Color, FenError, FenParser, Piece, Square};

use crate::movegen::is_king_attacked;
use crate::Board;

/// Castling rights flags.
///
/// A right survives only while the king and the matching rook have never left
/// their home squares, so the flags double as "has moved" markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Removes castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        let mask = match color {
            Color::White => !(Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE),
            Color::Black => !(Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE),
        };
        self.0 &= mask;
    }

    /// Removes kingside castling for a color.
    #[inline]
    pub fn remove_kingside(&mut self, color: Color) {
        let mask = match color {
            Color::White => !Self::WHITE_KINGSIDE,
            Color::Black => !Self::BLACK_KINGSIDE,
        };
        self.0 &= mask;
    }

    /// Removes queenside castling for a color.
    #[inline]
    pub fn remove_queenside(&mut self, color: Color) {
        let mask = match color {
            Color::White => !Self::WHITE_QUEENSIDE,
            Color::Black => !Self::BLACK_QUEENSIDE,
        };
        self.0 &= mask;
    }

    /// Removes the right tied to a rook corner, if `sq` is one.
    ///
    /// Called both when a piece leaves a corner and when a capture lands on one.
    pub fn remove_for_square(&mut self, sq: Square) {
        match sq {
            Square::A1 => self.remove_queenside(Color::White),
            Square::H1 => self.remove_kingside(Color::White),
            Square::A8 => self.remove_queenside(Color::Black),
            Square::H8 => self.remove_kingside(Color::Black),
            _ => {}
        }
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    fn from_fen_field(field: &str) -> Self {
        let mut flags = 0u8;
        for c in field.chars() {
            flags |= match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => 0,
            };
        }
        CastlingRights::new(flags)
    }

    fn to_fen_field(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut field = String::with_capacity(4);
        if self.can_castle_kingside(Color::White) {
            field.push('K');
        }
        if self.can_castle_queenside(Color::White) {
            field.push('Q');
        }
        if self.can_castle_kingside(Color::Black) {
            field.push('k');
        }
        if self.can_castle_queenside(Color::Black) {
            field.push('q');
        }
        field
    }
}

/// Home square of `color`'s king.
#[inline]
pub(crate) const fn king_home(color: Color) -> Square {
    match color {
        Color::White => Square::E1,
        Color::Black => Square::E8,
    }
}

/// Origin and destination of the rook when `color` castles.
#[inline]
pub(crate) const fn castling_rook_squares(color: Color, kingside: bool) -> (Square, Square) {
    match (color, kingside) {
        (Color::White, true) => (Square::H1, Square::F1),
        (Color::White, false) => (Square::A1, Square::D1),
        (Color::Black, true) => (Square::H8, Square::F8),
        (Color::Black, false) => (Square::A8, Square::D8),
    }
}

/// Complete chess position state.
///
/// A position is the single owner of all game state. Moves are applied and
/// reverted in place through [`Position::make_move`] and
/// [`Position::unmake_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Piece placement.
    pub board: Board,

    /// The side to move.
    pub side_to_move: Color,

    /// Castling rights.
    pub castling: CastlingRights,

    /// Square a pawn skipped on the previous ply, if any.
    pub en_passant: Option<Square>,

    /// Halfmove clock for 50-move rule.
    pub halfmove_clock: u32,

    /// Fullmove number (starts at 1, increments after Black's move).
    pub fullmove_number: u32,

    /// Whether each side's king is attacked, indexed by [`Color::index`].
    pub checked: [bool; 2],
}

impl Position {
    /// Creates an empty position.
    pub fn empty() -> Self {
        Position {
            board: Board::empty(),
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            checked: [false; 2],
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        let mut position = Position::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for color in Color::BOTH {
            for (file, piece) in back_rank.into_iter().enumerate() {
                let file = file as u8;
                if let Some(sq) = Square::from_coords(file, color.back_rank()) {
                    position.board.put(sq, piece, color);
                }
                if let Some(sq) = Square::from_coords(file, color.pawn_rank()) {
                    position.board.put(sq, Piece::Pawn, color);
                }
            }
        }
        position.castling = CastlingRights::ALL;
        position
    }

    /// Creates a position from a FEN string.
    ///
    /// Beyond the syntax checks done by [`FenParser`], each side must have
    /// exactly one king.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = FenParser::parse(fen)?;
        let mut position = Position::empty();

        // FEN starts from rank 8
        for (rank_idx, rank_str) in parsed.piece_placement.split('/').enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0u8;

            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    file += digit as u8;
                } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                    let sq = Square::from_coords(file, rank).ok_or_else(|| {
                        FenError::InvalidPiecePlacement(parsed.piece_placement.clone())
                    })?;
                    position.board.put(sq, piece, color);
                    file += 1;
                }
            }
        }

        for color in Color::BOTH {
            let count = position.board.count(Piece::King, color);
            if count != 1 {
                return Err(FenError::InvalidKingCount { color, count });
            }
        }

        // The side that just moved cannot have left its own king attacked.
        let waiting = parsed.active_color.opposite();
        if is_king_attacked(&position.board, waiting) {
            return Err(FenError::WaitingKingInCheck(waiting));
        }

        position.side_to_move = parsed.active_color;
        position.castling = CastlingRights::from_fen_field(&parsed.castling);
        position.en_passant = if parsed.en_passant == "-" {
            None
        } else {
            Square::from_algebraic(&parsed.en_passant)
        };
        position.halfmove_clock = parsed.halfmove_clock;
        position.fullmove_number = parsed.fullmove_number;
        position.refresh_checked();

        Ok(position)
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();

        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                let piece = Square::from_coords(file, rank).and_then(|sq| self.board.piece_at(sq));
                if let Some((piece, color)) = piece {
                    if empty_count > 0 {
                        placement.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    placement.push(piece.to_fen_char(color));
                } else {
                    empty_count += 1;
                }
            }
            if empty_count > 0 {
                placement.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        FenParser {
            piece_placement: placement,
            active_color: self.side_to_move,
            castling: self.castling.to_fen_field(),
            en_passant: self
                .en_passant
                .map_or_else(|| "-".to_string(), Square::to_algebraic),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    /// Returns the piece and color at the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        self.board.piece_at(sq)
    }

    /// Returns true if `color`'s king is currently attacked.
    #[inline]
    pub fn is_checked(&self, color: Color) -> bool {
        self.checked[color.index()]
    }

    /// Returns true if the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.is_checked(self.side_to_move)
    }

    /// Recomputes both check flags from the board.
    pub(crate) fn refresh_checked(&mut self) {
        for color in Color::BOTH {
            self.checked[color.index()] = is_king_attacked(&self.board, color);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
