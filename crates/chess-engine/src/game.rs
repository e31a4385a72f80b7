//! Full game management with history tracking.
//!
//! The [`Game`] struct owns the single [`Position`] of a game and is the
//! turn driver's entry point:
//! - Move requests are validated against the legal move set
//! - Every applied move is recorded and can be taken back
//! - The game status is re-evaluated after every move

use crate::movegen::{generate_moves, legal_moves};
use crate::rules::{GameStatus, RuleSet, StandardChess};
use crate::{MoveList, Position, SquareSet, Undo};
use chess_core::{Color, FenError, Move, MoveParseError, Piece, Square};
use thiserror::Error;
use tracing::{debug, info};

/// A recorded move in game history.
#[derive(Debug, Clone)]
pub struct GameMove {
    /// The move as applied, with its promotion kind resolved.
    pub mov: Move,
    /// Kind of the piece that moved.
    pub piece: Piece,
    /// The piece removed by the move, if any.
    pub captured: Option<(Piece, Color)>,
    /// Position description after the move.
    pub fen_after: String,
    undo: Undo,
}

/// Error type for game operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// The position description could not be turned into a position.
    #[error("malformed position: {0}")]
    MalformedPosition(#[from] FenError),

    /// The move or query refers to an empty square.
    #[error("no piece at {0}")]
    NoPieceAtSquare(Square),

    /// The move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// The move text could not be parsed.
    #[error("invalid move notation: {0}")]
    InvalidNotation(#[from] MoveParseError),

    /// The game has already ended.
    #[error("game is over: {0}")]
    GameOver(GameStatus),

    /// There is no move to take back.
    #[error("no move to undo")]
    NothingToUndo,
}

/// A complete chess game with history tracking.
#[derive(Debug, Clone)]
pub struct Game {
    /// Current position.
    position: Position,
    /// Description of the starting position.
    start_fen: String,
    /// Applied moves, oldest first.
    moves: Vec<GameMove>,
    /// Status of the current position.
    status: GameStatus,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_position(StandardChess.initial_position())
    }

    /// Creates a game from a custom starting position.
    pub fn from_position(position: Position) -> Self {
        let status = StandardChess.status(&position);
        Game {
            start_fen: position.to_fen(),
            position,
            moves: Vec::new(),
            status,
        }
    }

    /// Creates a game from a FEN string.
    ///
    /// A malformed description yields [`GameError::MalformedPosition`] and no
    /// game is created.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let position = Position::from_fen(fen)?;
        Ok(Self::from_position(position))
    }

    /// Returns a reference to the current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the side to move.
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    /// Returns all legal moves for the side to move.
    pub fn legal_moves(&self) -> MoveList {
        generate_moves(&self.position)
    }

    /// Legal moves of the piece on `sq`.
    pub fn legal_moves_from(&self, sq: Square) -> Result<MoveList, GameError> {
        if self.position.piece_at(sq).is_none() {
            return Err(GameError::NoPieceAtSquare(sq));
        }
        Ok(legal_moves(&self.position, sq))
    }

    /// Squares the piece on `sq` can legally move to.
    pub fn legal_destinations(&self, sq: Square) -> Result<SquareSet, GameError> {
        Ok(self.legal_moves_from(sq)?.iter().map(|m| m.to()).collect())
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.position.in_check()
    }

    /// Returns the status of the current position.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns true if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.status.is_over()
    }

    /// Returns the move history.
    pub fn move_history(&self) -> &[GameMove] {
        &self.moves
    }

    /// Returns the number of half-moves (plies) played.
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    /// Position descriptions from the start of the game to now.
    pub fn positions(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(self.start_fen.as_str())
            .chain(self.moves.iter().map(|record| record.fen_after.as_str()))
    }

    /// Makes a move and returns the captured piece, if any.
    ///
    /// A request without a promotion kind for a pawn reaching the last rank
    /// promotes to a queen. Rejected requests leave the game unchanged.
    pub fn make_move(&mut self, m: Move) -> Result<Option<(Piece, Color)>, GameError> {
        if self.status.is_over() {
            return Err(GameError::GameOver(self.status));
        }

        let Some((_, color)) = self.position.piece_at(m.from()) else {
            return Err(GameError::NoPieceAtSquare(m.from()));
        };
        let side = self.position.side_to_move;
        if color != side {
            return Err(GameError::IllegalMove(format!("{}: {} to move", m, side)));
        }

        let resolved = self
            .resolve(m)
            .ok_or_else(|| GameError::IllegalMove(m.to_uci()))?;
        Ok(self.apply_move(resolved))
    }

    /// Makes a move given in UCI notation.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Option<(Piece, Color)>, GameError> {
        let m = Move::from_uci(uci)?;
        self.make_move(m)
    }

    /// Takes back the last move.
    pub fn undo_move(&mut self) -> Result<GameMove, GameError> {
        let record = self.moves.pop().ok_or(GameError::NothingToUndo)?;
        self.position.unmake_move(record.mov, record.undo);
        self.status = StandardChess.status(&self.position);
        debug!(mv = %record.mov, fen = %self.position.to_fen(), "undid move");
        Ok(record)
    }

    /// Returns the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Finds the legal move matching a request. A missing promotion kind
    /// matches the queen promotion.
    fn resolve(&self, m: Move) -> Option<Move> {
        legal_moves(&self.position, m.from())
            .iter()
            .copied()
            .find(|legal| {
                legal.to() == m.to()
                    && (legal.promotion() == m.promotion()
                        || (m.promotion().is_none() && legal.promotion() == Some(Piece::Queen)))
            })
    }

    /// Internal method to apply a legal move.
    fn apply_move(&mut self, m: Move) -> Option<(Piece, Color)> {
        let undo = self.position.make_move(m);
        let fen_after = self.position.to_fen();
        debug!(mv = %m, fen = %fen_after, "applied move");

        let captured = undo.captured();
        self.moves.push(GameMove {
            mov: m,
            piece: undo.moved(),
            captured,
            fen_after,
            undo,
        });

        self.status = StandardChess.status(&self.position);
        if self.status.is_over() {
            info!(status = %self.status, plies = self.moves.len(), "game over");
        }
        captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::FenParser;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.ply_count(), 0);
        assert!(!game.is_game_over());
        assert!(!game.is_check());
        assert_eq!(game.to_fen(), FenParser::STARTPOS);
        assert_eq!(game.legal_moves().len(), 20);
    }

    #[test]
    fn make_move_uci() {
        let mut game = Game::new();
        assert_eq!(game.make_move_uci("e2e4").unwrap(), None);
        assert_eq!(game.ply_count(), 1);
        assert_eq!(game.move_history()[0].piece, Piece::Pawn);
        assert_eq!(
            game.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn capture_is_returned() {
        let mut game = Game::new();
        game.make_move_uci("e2e4").unwrap();
        game.make_move_uci("d7d5").unwrap();
        let captured = game.make_move_uci("e4d5").unwrap();
        assert_eq!(captured, Some((Piece::Pawn, Color::Black)));
        assert_eq!(game.move_history()[2].captured, captured);
    }

    #[test]
    fn illegal_move_leaves_game_unchanged() {
        let mut game = Game::new();
        let before = game.to_fen();
        let result = game.make_move_uci("e2e5");
        assert!(matches!(result, Err(GameError::IllegalMove(_))));
        assert_eq!(game.to_fen(), before);
        assert_eq!(game.ply_count(), 0);
    }

    #[test]
    fn wrong_side_is_illegal() {
        let mut game = Game::new();
        let result = game.make_move_uci("e7e5");
        assert!(matches!(result, Err(GameError::IllegalMove(_))));
    }

    #[test]
    fn empty_origin_is_rejected() {
        let mut game = Game::new();
        assert_eq!(
            game.make_move_uci("e4e5"),
            Err(GameError::NoPieceAtSquare(sq("e4")))
        );
        assert_eq!(
            game.legal_destinations(sq("e4")),
            Err(GameError::NoPieceAtSquare(sq("e4")))
        );
    }

    #[test]
    fn bad_notation_is_rejected() {
        let mut game = Game::new();
        assert!(matches!(
            game.make_move_uci("e2"),
            Err(GameError::InvalidNotation(_))
        ));
    }

    #[test]
    fn malformed_fen_is_rejected() {
        assert!(matches!(
            Game::from_fen("rnbqkbnr/pppppppp w KQkq - 0 1"),
            Err(GameError::MalformedPosition(_))
        ));
        assert!(matches!(
            Game::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(GameError::MalformedPosition(FenError::InvalidKingCount { .. }))
        ));
    }

    #[test]
    fn legal_destinations_for_knight() {
        let game = Game::new();
        let dests = game.legal_destinations(sq("b1")).unwrap();
        assert_eq!(dests.len(), 2);
        assert!(dests.contains(sq("a3")));
        assert!(dests.contains(sq("c3")));
    }

    #[test]
    fn checkmate_fools_mate() {
        let mut game = Game::new();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.make_move_uci(uci).unwrap();
        }
        assert!(game.is_game_over());
        assert!(game.is_check());
        assert_eq!(
            game.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
    }

    #[test]
    fn stalemate() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.status(), GameStatus::Stalemate);
    }

    #[test]
    fn cannot_move_after_game_over() {
        let mut game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = game.make_move_uci("h8g8");
        assert_eq!(result, Err(GameError::GameOver(GameStatus::Stalemate)));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let mut game = Game::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        game.make_move_uci("a7a8").unwrap();
        assert_eq!(
            game.position().piece_at(sq("a8")),
            Some((Piece::Queen, Color::White))
        );
        assert!(game.to_fen().starts_with("Q7/"));
        assert_eq!(game.move_history()[0].mov.promotion(), Some(Piece::Queen));
    }

    #[test]
    fn underpromotion_on_request() {
        let mut game = Game::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        game.make_move_uci("a7a8r").unwrap();
        assert!(game.to_fen().starts_with("R7/"));
    }

    #[test]
    fn promotion_kind_on_ordinary_move_is_illegal() {
        let mut game = Game::new();
        assert!(matches!(
            game.make_move_uci("e2e4q"),
            Err(GameError::IllegalMove(_))
        ));
    }

    #[test]
    fn undo_restores_previous_state() {
        let mut game = Game::new();
        game.make_move_uci("e2e4").unwrap();
        let after_first = game.position().clone();
        game.make_move_uci("d7d5").unwrap();
        game.make_move_uci("e4d5").unwrap();

        let record = game.undo_move().unwrap();
        assert_eq!(record.mov.to_uci(), "e4d5");
        game.undo_move().unwrap();
        assert_eq!(game.position(), &after_first);

        game.undo_move().unwrap();
        assert_eq!(game.to_fen(), FenParser::STARTPOS);
        assert_eq!(game.undo_move().unwrap_err(), GameError::NothingToUndo);
    }

    #[test]
    fn undo_reopens_finished_game() {
        let mut game = Game::new();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.make_move_uci(uci).unwrap();
        }
        game.undo_move().unwrap();
        assert_eq!(game.status(), GameStatus::Ongoing);
        assert!(game.make_move_uci("d8g5").is_ok());
    }

    #[test]
    fn positions_track_history() {
        let mut game = Game::new();
        game.make_move_uci("g1f3").unwrap();
        game.make_move_uci("g8f6").unwrap();

        let positions: Vec<&str> = game.positions().collect();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0], FenParser::STARTPOS);
        assert_eq!(positions[2], game.to_fen());
        assert_eq!(
            positions[1],
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1"
        );
    }
}
