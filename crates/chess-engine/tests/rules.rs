//! Rules behaviour through the public API, plus property tests over random
//! legal move sequences from the starting position.

use chess_core::{Color, FenError, Move, Piece, Square};
use chess_engine::{
    generate_moves, is_king_attacked, legal_moves_for, Game, GameError, GameStatus, Position,
    RuleSet, StandardChess,
};
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

fn sq(s: &str) -> Square {
    Square::from_algebraic(s).unwrap()
}

/// Plays `num_moves` random legal moves from the start, stopping early at a
/// finished game. Returns the position with the applied moves and their undo
/// records.
fn random_line(seed: u64, num_moves: usize) -> (Position, Vec<(Move, chess_engine::Undo)>) {
    let mut position = Position::startpos();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut history = Vec::new();

    for _ in 0..num_moves {
        let moves = generate_moves(&position);
        if moves.is_empty() {
            break;
        }
        let m = moves[rng.gen_range(0..moves.len())];
        let undo = position.make_move(m);
        history.push((m, undo));
    }
    (position, history)
}

#[test]
fn white_has_twenty_moves_and_black_always_replies() {
    let start = Position::startpos();
    let moves = generate_moves(&start);
    assert_eq!(moves.len(), 20);

    let pawn_moves = moves
        .iter()
        .filter(|m| start.piece_at(m.from()).map(|(p, _)| p) == Some(Piece::Pawn))
        .count();
    assert_eq!(pawn_moves, 16);

    for &m in &moves {
        let mut position = start.clone();
        position.make_move(m);
        assert!(!legal_moves_for(&position, Color::Black).is_empty());
    }
}

#[test]
fn stalemate_is_reported() {
    let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(game.status(), GameStatus::Stalemate);
    assert!(!game.is_check());
}

#[test]
fn back_rank_mate_names_white() {
    let mut game = Game::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    game.make_move_uci("a1a8").unwrap();
    assert_eq!(
        game.status(),
        GameStatus::Checkmate {
            winner: Color::White
        }
    );
    assert!(matches!(
        game.make_move_uci("g8h8"),
        Err(GameError::GameOver(_))
    ));
}

#[test]
fn back_rank_mate_names_black() {
    let mut game = Game::from_fen("3q2k1/8/8/8/8/8/5PPP/6K1 b - - 0 1").unwrap();
    game.make_move_uci("d8d1").unwrap();
    assert_eq!(
        game.status(),
        GameStatus::Checkmate {
            winner: Color::Black
        }
    );
}

#[test]
fn auto_queen_shows_in_description() {
    let mut game = Game::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    game.make_move_uci("b7b8").unwrap();
    assert_eq!(game.to_fen(), "1Q2k3/8/8/8/8/8/8/4K3 b - - 0 1");
}

#[test]
fn black_promotion_is_lowercase() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/6p1/4K3 b - - 0 1").unwrap();
    game.make_move_uci("g2g1n").unwrap();
    assert_eq!(game.to_fen(), "4k3/8/8/8/8/8/8/4K1n1 w - - 0 2");
}

#[test]
fn en_passant_captures_behind_and_expires() {
    let mut game = Game::new();
    for uci in ["e2e4", "a7a6", "e4e5", "d7d5"] {
        game.make_move_uci(uci).unwrap();
    }
    assert_eq!(game.position().en_passant, Some(sq("d6")));

    let mut taken = game.clone();
    let captured = taken.make_move_uci("e5d6").unwrap();
    assert_eq!(captured, Some((Piece::Pawn, Color::Black)));
    assert_eq!(taken.position().piece_at(sq("d5")), None);
    assert_eq!(
        taken.position().piece_at(sq("d6")),
        Some((Piece::Pawn, Color::White))
    );

    // One ply of delay and the capture is gone.
    game.make_move_uci("h2h3").unwrap();
    assert_eq!(game.position().en_passant, None);
    game.make_move_uci("a6a5").unwrap();
    assert!(matches!(
        game.make_move_uci("e5d6"),
        Err(GameError::IllegalMove(_))
    ));
}

#[test]
fn castling_through_attack_is_refused() {
    let game = Game::from_fen("1k3r2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    let king = game.legal_destinations(sq("e1")).unwrap();
    assert!(!king.contains(sq("g1")));
    assert!(king.contains(sq("c1")));
}

#[test]
fn castling_rights_lost_after_king_moves_and_returns() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    for uci in ["e1f1", "e8f8", "f1e1", "f8e8"] {
        game.make_move_uci(uci).unwrap();
    }
    assert!(!game.legal_destinations(sq("e1")).unwrap().contains(sq("g1")));
    assert!(game.to_fen().contains(" w - - "));
}

#[test]
fn rules_trait_agrees_with_game() {
    let position = StandardChess.initial_position();
    assert!(StandardChess.is_legal(&position, Move::from_uci("g1f3").unwrap()));
    assert_eq!(StandardChess.status(&position), Game::new().status());
}

#[test]
fn king_left_en_prise_is_not_a_position() {
    // Black is in check, but it is White's turn: the last Black move was illegal.
    assert_eq!(
        Game::from_fen("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1").unwrap_err(),
        GameError::MalformedPosition(FenError::WaitingKingInCheck(Color::Black))
    );
}

#[test]
fn kings_are_never_capture_targets() {
    // Black to move and in check; the White rook still may not take the king.
    let game = Game::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").unwrap();
    let rook = game.legal_destinations(sq("e1")).unwrap();
    assert!(rook.contains(sq("e7")));
    assert!(!rook.contains(sq("e8")));

    let mut game = game;
    game.make_move_uci("e8d7").unwrap();
    assert_eq!(game.position().board.count(Piece::King, Color::Black), 1);
    assert_eq!(Position::from_fen(&game.to_fen()).unwrap().to_fen(), game.to_fen());
}

#[test]
fn move_counters_saturate() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 4294967295 4294967295").unwrap();
    game.make_move_uci("e8d8").unwrap();
    assert_eq!(game.to_fen(), "3k4/8/8/8/8/8/8/4K3 w - - 4294967295 4294967295");
    game.undo_move().unwrap();
    assert_eq!(game.to_fen(), "4k3/8/8/8/8/8/8/4K3 b - - 4294967295 4294967295");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// No returned legal move leaves the mover's king attacked.
    #[test]
    fn legal_moves_keep_king_safe(seed in any::<u64>(), num_moves in 0..30usize) {
        let (mut position, _) = random_line(seed, num_moves);
        let mover = position.side_to_move;
        for m in generate_moves(&position).iter().copied() {
            let undo = position.make_move(m);
            prop_assert!(!is_king_attacked(&position.board, mover), "{} leaves king attacked", m);
            position.unmake_move(m, undo);
        }
    }

    /// Decoding an encoded reachable position reproduces it exactly.
    #[test]
    fn description_roundtrip(seed in any::<u64>(), num_moves in 0..40usize) {
        let (position, _) = random_line(seed, num_moves);
        let fen = position.to_fen();
        let decoded = Position::from_fen(&fen).unwrap();
        prop_assert_eq!(&decoded, &position);
        prop_assert_eq!(decoded.to_fen(), fen);
    }

    /// Unmaking every move in reverse restores the starting position.
    #[test]
    fn make_unmake_restores_state(seed in any::<u64>(), num_moves in 1..40usize) {
        let (mut position, mut history) = random_line(seed, num_moves);
        while let Some((m, undo)) = history.pop() {
            position.unmake_move(m, undo);
        }
        prop_assert_eq!(position, Position::startpos());
    }

    /// The stored check flag always matches a fresh attack computation.
    #[test]
    fn check_flags_are_current(seed in any::<u64>(), num_moves in 0..40usize) {
        let (position, _) = random_line(seed, num_moves);
        for color in Color::BOTH {
            prop_assert_eq!(position.is_checked(color), is_king_attacked(&position.board, color));
        }
    }

    /// Each side keeps exactly one king, and the occupancy index matches the cells.
    #[test]
    fn board_stays_consistent(seed in any::<u64>(), num_moves in 0..40usize) {
        let (position, _) = random_line(seed, num_moves);
        for color in Color::BOTH {
            prop_assert_eq!(position.board.count(Piece::King, color), 1);
            for sq in Square::all() {
                let indexed = position.board.occupied_by(color).contains(sq);
                let on_board = position.board.color_at(sq) == Some(color);
                prop_assert_eq!(indexed, on_board);
            }
        }
    }
}
