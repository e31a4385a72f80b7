//! Attack sets for all piece types.
//!
//! Leaper attacks (knight, king, pawn) come from tables built at compile time.
//! Slider attacks walk rays on the mailbox board and stop at the first
//! occupied square, which is included.

use crate::{Board, SquareSet};
use chess_core::{Color, Piece, Square};

/// Orthogonal ray directions as (file, rank) steps.
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Diagonal ray directions as (file, rank) steps.
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Precomputed knight attack tables.
const KNIGHT_ATTACKS: [SquareSet; 64] = compute_leaper_attacks(&KNIGHT_OFFSETS);

/// Precomputed king attack tables.
const KING_ATTACKS: [SquareSet; 64] = compute_leaper_attacks(&KING_OFFSETS);

/// Precomputed pawn attack tables [color][square].
const PAWN_ATTACKS: [[SquareSet; 64]; 2] = [
    compute_leaper_attacks(&[(-1, 1), (1, 1)]),
    compute_leaper_attacks(&[(-1, -1), (1, -1)]),
];

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> SquareSet {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> SquareSet {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the two forward diagonals a pawn of `color` on `sq` attacks,
/// whether or not anything stands there.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> SquareSet {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Walks each direction from `from` until the edge or the first occupied
/// square.
pub fn slider_attacks(board: &Board, from: Square, directions: &[(i8, i8)]) -> SquareSet {
    let mut attacks = SquareSet::EMPTY;
    for &(file_step, rank_step) in directions {
        let mut current = from;
        while let Some(next) = current.offset(file_step, rank_step) {
            attacks.insert(next);
            if !board.is_empty(next) {
                break;
            }
            current = next;
        }
    }
    attacks
}

/// Returns bishop attacks from `sq` on this board.
#[inline]
pub fn bishop_attacks(board: &Board, sq: Square) -> SquareSet {
    slider_attacks(board, sq, &BISHOP_DIRECTIONS)
}

/// Returns rook attacks from `sq` on this board.
#[inline]
pub fn rook_attacks(board: &Board, sq: Square) -> SquareSet {
    slider_attacks(board, sq, &ROOK_DIRECTIONS)
}

/// Returns queen attacks from `sq` on this board.
#[inline]
pub fn queen_attacks(board: &Board, sq: Square) -> SquareSet {
    bishop_attacks(board, sq) | rook_attacks(board, sq)
}

/// Squares attacked by the piece standing on `sq`.
///
/// Pawn pushes and castling are not attacks and are never included.
pub fn attacks_from(board: &Board, sq: Square) -> SquareSet {
    match board.piece_at(sq) {
        None => SquareSet::EMPTY,
        Some((Piece::Pawn, color)) => pawn_attacks(sq, color),
        Some((Piece::Knight, _)) => knight_attacks(sq),
        Some((Piece::Bishop, _)) => bishop_attacks(board, sq),
        Some((Piece::Rook, _)) => rook_attacks(board, sq),
        Some((Piece::Queen, _)) => queen_attacks(board, sq),
        Some((Piece::King, _)) => king_attacks(sq),
    }
}

/// Returns true if any piece of `by_color` attacks `sq`.
///
/// Looks outward from the target square with each piece's attack pattern
/// and checks for a matching attacker at the end.
pub fn is_square_attacked(board: &Board, sq: Square, by_color: Color) -> bool {
    let holds = |set: SquareSet, kinds: &[Piece]| {
        set.iter().any(|from| {
            matches!(board.piece_at(from), Some((piece, color)) if color == by_color && kinds.contains(&piece))
        })
    };

    // A pawn of by_color attacks sq from where a defending pawn on sq would attack.
    holds(pawn_attacks(sq, by_color.opposite()), &[Piece::Pawn])
        || holds(knight_attacks(sq), &[Piece::Knight])
        || holds(king_attacks(sq), &[Piece::King])
        || holds(bishop_attacks(board, sq), &[Piece::Bishop, Piece::Queen])
        || holds(rook_attacks(board, sq), &[Piece::Rook, Piece::Queen])
}

/// Returns true if `king_color`'s king is attacked by the other side.
///
/// A board without that king reports no attack.
pub fn is_king_attacked(board: &Board, king_color: Color) -> bool {
    board
        .king_square(king_color)
        .is_some_and(|king_sq| is_square_attacked(board, king_sq, king_color.opposite()))
}

/// Builds a table of attack sets for a piece that jumps by fixed offsets.
const fn compute_leaper_attacks(offsets: &[(i8, i8)]) -> [SquareSet; 64] {
    let mut attacks = [SquareSet::EMPTY; 64];
    let mut index = 0u8;

    while index < 64 {
        let mut bits = 0u64;
        if let Some(sq) = Square::from_index(index) {
            let mut i = 0;
            while i < offsets.len() {
                let (file_delta, rank_delta) = offsets[i];
                if let Some(target) = sq.offset(file_delta, rank_delta) {
                    bits |= 1u64 << target.index();
                }
                i += 1;
            }
        }
        attacks[index as usize] = SquareSet::from_bits(bits);
        index += 1;
    }

    attacks
}
