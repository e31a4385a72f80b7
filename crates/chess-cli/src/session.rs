//! Line-oriented command interpreter over a [`Game`].
//!
//! A [`Session`] reads one command per call to [`Session::handle`] and
//! writes its answers to any [`Write`] sink, so the terminal loop in `main`
//! and the tests drive it the same way.

use crate::policy::MovePolicy;
use chess_analysis::{Analyzer, EngineError};
use chess_core::{Color, Move, Piece, Square};
use chess_engine::{Game, GameError};
use std::io::{self, Write};
use thiserror::Error;
use tracing::debug;

const HELP: &str = "\
commands:
  <move>          play a move in UCI notation, e.g. e2e4 or e7e8n
  moves <square>  list the legal destinations of the piece on a square
  undo            take back the last move (and the opponent's reply)
  fen             print the position description
  status          print the game status
  eval            ask the analysis engine about the position
  help            show this text
  quit            leave";

/// Whether the input loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Failure of a single command. Only `Io` ends the session.
#[derive(Debug, Error)]
enum CommandError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("analysis failed: {0}")]
    Engine(#[from] EngineError),
    #[error("invalid square: {0}")]
    InvalidSquare(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An interactive game against an optional opponent.
pub struct Session<W: Write> {
    game: Game,
    out: W,
    /// Side entered at the terminal when an opponent plays the other one.
    human: Color,
    opponent: Option<Box<dyn MovePolicy>>,
    analyzer: Option<Box<dyn Analyzer>>,
    depth: u32,
}

impl<W: Write> Session<W> {
    /// Creates a session where every move is entered at the terminal.
    pub fn new(game: Game, out: W) -> Self {
        Session {
            game,
            out,
            human: Color::White,
            opponent: None,
            analyzer: None,
            depth: 12,
        }
    }

    /// Lets `policy` play every move of the side opposite `human`.
    pub fn with_opponent(mut self, policy: Box<dyn MovePolicy>, human: Color) -> Self {
        self.opponent = Some(policy);
        self.human = human;
        self
    }

    /// Enables the `eval` command.
    pub fn with_analyzer(mut self, analyzer: Box<dyn Analyzer>, depth: u32) -> Self {
        self.analyzer = Some(analyzer);
        self.depth = depth;
        self
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Prints the opening position and lets the opponent move first if it
    /// has the move.
    pub fn start(&mut self) -> io::Result<()> {
        if let Some(policy) = &self.opponent {
            writeln!(
                self.out,
                "you play {}, {} opponent plays {}",
                self.human,
                policy.name(),
                self.human.opposite()
            )?;
        }
        writeln!(self.out, "fen: {}", self.game.to_fen())?;
        self.write_status()?;
        let result = self.reply();
        self.settle(result)
    }

    /// Runs one command line.
    pub fn handle(&mut self, line: &str) -> io::Result<Flow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Flow::Continue);
        };

        let result = match command {
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => writeln!(self.out, "{HELP}").map_err(CommandError::from),
            "fen" => writeln!(self.out, "fen: {}", self.game.to_fen()).map_err(CommandError::from),
            "status" => self.write_status().map_err(CommandError::from),
            "undo" => self.undo(),
            "moves" => self.show_moves(words.next()),
            "eval" => self.eval(),
            text => self.play(text),
        };
        self.settle(result)?;
        Ok(Flow::Continue)
    }

    /// Consumes the session and returns its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Reports a failed command and keeps going, unless the output itself failed.
    fn settle(&mut self, result: Result<(), CommandError>) -> io::Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(CommandError::Io(e)) => Err(e),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn play(&mut self, text: &str) -> Result<(), CommandError> {
        let requested = Move::from_uci(text).map_err(GameError::from)?;
        let side = self.game.side_to_move();
        let captured = self.game.make_move(requested)?;
        // The recorded move carries the promotion kind the request left out.
        let applied = self
            .game
            .move_history()
            .last()
            .map_or(requested, |record| record.mov);
        self.report_move(side, applied, captured)?;
        self.reply()
    }

    /// Lets the opponent move if it is its turn.
    fn reply(&mut self) -> Result<(), CommandError> {
        let Some(policy) = self.opponent.as_mut() else {
            return Ok(());
        };
        let side = self.game.side_to_move();
        if side == self.human || self.game.is_game_over() {
            return Ok(());
        }
        let Some(m) = policy.choose(&self.game) else {
            return Ok(());
        };
        debug!(mv = %m, policy = policy.name(), "opponent move");
        let captured = self.game.make_move(m)?;
        self.report_move(side, m, captured)?;
        Ok(())
    }

    fn undo(&mut self) -> Result<(), CommandError> {
        // Against an opponent, take back its reply too so the person moves again.
        let plies = if self.opponent.is_some() && self.game.side_to_move() == self.human {
            2
        } else {
            1
        };
        if self.game.ply_count() < plies {
            return Err(GameError::NothingToUndo.into());
        }
        for _ in 0..plies {
            let record = self.game.undo_move()?;
            writeln!(self.out, "undid {}", record.mov)?;
        }
        writeln!(self.out, "fen: {}", self.game.to_fen())?;
        self.write_status()?;
        self.reply()
    }

    fn show_moves(&mut self, arg: Option<&str>) -> Result<(), CommandError> {
        let arg = arg.ok_or(CommandError::Usage("moves <square>"))?;
        let sq = Square::from_algebraic(arg)
            .ok_or_else(|| CommandError::InvalidSquare(arg.to_string()))?;
        let destinations = self.game.legal_destinations(sq)?;
        if destinations.is_empty() {
            writeln!(self.out, "moves from {sq}: none")?;
            return Ok(());
        }
        let listed: Vec<String> = destinations.iter().map(|to| to.to_string()).collect();
        writeln!(self.out, "moves from {sq}: {}", listed.join(" "))?;
        Ok(())
    }

    fn eval(&mut self) -> Result<(), CommandError> {
        let Some(analyzer) = self.analyzer.as_mut() else {
            writeln!(self.out, "no analysis engine available")?;
            return Ok(());
        };
        let analysis = analyzer.analyze(&self.game.to_fen(), self.depth)?;
        let evaluation = analysis.evaluation.for_white(self.game.side_to_move());
        writeln!(
            self.out,
            "eval: {evaluation} (depth {}), best move {}",
            analysis.depth, analysis.best_move
        )?;
        Ok(())
    }

    fn report_move(
        &mut self,
        side: Color,
        m: Move,
        captured: Option<(Piece, Color)>,
    ) -> io::Result<()> {
        writeln!(self.out, "{side} plays {m}")?;
        if let Some((piece, color)) = captured {
            writeln!(self.out, "captured {color} {piece}")?;
        }
        writeln!(self.out, "fen: {}", self.game.to_fen())?;
        self.write_status()
    }

    fn write_status(&mut self) -> io::Result<()> {
        let status = self.game.status();
        if self.game.is_check() && !status.is_over() {
            writeln!(
                self.out,
                "status: {status}, {} in check",
                self.game.side_to_move()
            )
        } else {
            writeln!(self.out, "status: {status}")
        }
    }
}
