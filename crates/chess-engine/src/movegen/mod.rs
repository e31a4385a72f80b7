//! Move generation.
//!
//! Generation happens in two stages. [`pseudo_legal_destinations`] gives the
//! squares a piece can reach by its movement rules alone. The legal move
//! functions then probe each candidate by applying it, checking whether the
//! mover's king is attacked, and reverting it.

mod attacks;
pub mod perft;

use crate::position::{castling_rook_squares, king_home};
use crate::{Position, SquareSet};
use chess_core::{Color, Move, Piece, Square};

pub use attacks::{
    attacks_from, bishop_attacks, is_king_attacked, is_square_attacked, king_attacks,
    knight_attacks, pawn_attacks, queen_attacks, rook_attacks, slider_attacks, BISHOP_DIRECTIONS,
    ROOK_DIRECTIONS,
};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves a list can hold.
    pub const MAX_MOVES: usize = 256;

    const FILLER: Move = Move::new(Square::A1, Square::A1);

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Self::FILLER; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Returns an iterator over the moves.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Returns true if the list holds `m`.
    pub fn contains(&self, m: &Move) -> bool {
        self.as_slice().contains(m)
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl Extend<Move> for MoveList {
    fn extend<I: IntoIterator<Item = Move>>(&mut self, iter: I) {
        for m in iter {
            self.push(m);
        }
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        let mut list = MoveList::new();
        list.extend(iter);
        list
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Squares the piece on `from` can reach by its movement rules, ignoring
/// whether its own king would be left attacked.
///
/// Returns an empty set for an empty square. Castling destinations are
/// included for a king, with every castling condition already checked.
pub fn pseudo_legal_destinations(position: &Position, from: Square) -> SquareSet {
    let board = &position.board;
    let Some((piece, color)) = board.piece_at(from) else {
        return SquareSet::EMPTY;
    };
    let not_own = !board.occupied_by(color);

    let mut destinations = match piece {
        Piece::Pawn => pawn_destinations(position, from, color),
        Piece::Knight => knight_attacks(from) & not_own,
        Piece::Bishop => bishop_attacks(board, from) & not_own,
        Piece::Rook => rook_attacks(board, from) & not_own,
        Piece::Queen => queen_attacks(board, from) & not_own,
        Piece::King => (king_attacks(from) & not_own) | castling_destinations(position, from, color),
    };
    // Kings are never captured, even by the side not to move.
    if let Some(king) = board.king_square(color.opposite()) {
        destinations.remove(king);
    }
    destinations
}

fn pawn_destinations(position: &Position, from: Square, color: Color) -> SquareSet {
    let board = &position.board;
    let direction = color.pawn_direction();
    let mut destinations = SquareSet::EMPTY;

    if let Some(single) = from.offset(0, direction) {
        if board.is_empty(single) {
            destinations.insert(single);
            if from.rank_index() == color.pawn_rank() {
                if let Some(double) = from.offset(0, 2 * direction) {
                    if board.is_empty(double) {
                        destinations.insert(double);
                    }
                }
            }
        }
    }

    for to in pawn_attacks(from, color) {
        match board.color_at(to) {
            Some(other) if other != color => destinations.insert(to),
            None if is_en_passant_target(position, to, color) => destinations.insert(to),
            _ => {}
        }
    }

    destinations
}

/// The target must be the recorded skip square on the capturer's en passant
/// rank, with the opposing pawn standing just behind it.
fn is_en_passant_target(position: &Position, to: Square, color: Color) -> bool {
    position.en_passant == Some(to)
        && to.rank_index() == color.en_passant_capture_rank()
        && to
            .offset(0, -color.pawn_direction())
            .is_some_and(|victim| position.board.has(victim, Piece::Pawn, color.opposite()))
}

fn castling_destinations(position: &Position, from: Square, color: Color) -> SquareSet {
    let board = &position.board;
    let them = color.opposite();
    let mut destinations = SquareSet::EMPTY;

    if from != king_home(color) || is_square_attacked(board, from, them) {
        return destinations;
    }

    for kingside in [true, false] {
        let allowed = if kingside {
            position.castling.can_castle_kingside(color)
        } else {
            position.castling.can_castle_queenside(color)
        };
        let (rook_from, _) = castling_rook_squares(color, kingside);
        if !allowed || !board.has(rook_from, Piece::Rook, color) {
            continue;
        }

        let step: i8 = if kingside { 1 } else { -1 };
        let (Some(transit), Some(target)) = (from.offset(step, 0), from.offset(2 * step, 0)) else {
            continue;
        };
        let extra_clear = if kingside {
            true
        } else {
            from.offset(-3, 0).is_some_and(|sq| board.is_empty(sq))
        };

        if board.is_empty(transit)
            && board.is_empty(target)
            && extra_clear
            && !is_square_attacked(board, transit, them)
            && !is_square_attacked(board, target, them)
        {
            destinations.insert(target);
        }
    }

    destinations
}

/// Turns the destinations of the piece on `from` into moves, expanding each
/// promotion square into one move per promotion piece.
fn candidate_moves(position: &Position, from: Square) -> MoveList {
    let mut candidates = MoveList::new();
    let Some((piece, color)) = position.board.piece_at(from) else {
        return candidates;
    };

    for to in pseudo_legal_destinations(position, from) {
        if piece == Piece::Pawn && to.rank_index() == color.promotion_rank() {
            candidates.extend(
                Piece::PROMOTIONS
                    .iter()
                    .map(|&promotion| Move::with_promotion(from, to, promotion)),
            );
        } else {
            candidates.push(Move::new(from, to));
        }
    }
    candidates
}

/// Applies `m` to `scratch`, checks the mover's king, and reverts it.
fn leaves_king_safe(scratch: &mut Position, m: Move, color: Color) -> bool {
    let undo = scratch.make_move(m);
    let safe = !is_king_attacked(&scratch.board, color);
    scratch.unmake_move(m, undo);
    safe
}

fn push_legal_from(scratch: &mut Position, from: Square, moves: &mut MoveList) {
    let Some((_, color)) = scratch.board.piece_at(from) else {
        return;
    };
    for m in candidate_moves(scratch, from).iter().copied() {
        if leaves_king_safe(scratch, m, color) {
            moves.push(m);
        }
    }
}

/// Legal moves of the piece on `from`, whichever side it belongs to.
///
/// Returns an empty list for an empty square.
pub fn legal_moves(position: &Position, from: Square) -> MoveList {
    let mut scratch = position.clone();
    let mut moves = MoveList::new();
    push_legal_from(&mut scratch, from, &mut moves);
    moves
}

/// Destination squares of the legal moves of the piece on `from`.
pub fn legal_destinations(position: &Position, from: Square) -> SquareSet {
    legal_moves(position, from).iter().map(|m| m.to()).collect()
}

/// All legal moves of `color`'s pieces.
pub fn legal_moves_for(position: &Position, color: Color) -> MoveList {
    let mut scratch = position.clone();
    let mut moves = MoveList::new();
    for from in position.board.occupied_by(color) {
        push_legal_from(&mut scratch, from, &mut moves);
    }
    moves
}

/// Generates all legal moves for the side to move.
pub fn generate_moves(position: &Position) -> MoveList {
    legal_moves_for(position, position.side_to_move)
}

/// Returns true if `color` has at least one legal move.
pub fn has_legal_move(position: &Position, color: Color) -> bool {
    let mut scratch = position.clone();
    for from in position.board.occupied_by(color) {
        let candidates = candidate_moves(&scratch, from);
        if candidates
            .iter()
            .any(|&m| leaves_king_safe(&mut scratch, m, color))
        {
            return true;
        }
    }
    false
}

/// Returns true if `m` is among the legal moves of the piece on its origin.
pub fn is_legal(position: &Position, m: Move) -> bool {
    legal_moves(position, m.from()).contains(&m)
}
