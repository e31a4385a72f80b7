//! Boundary to an external analysis engine.
//!
//! - [`Analyzer`] - anything that can suggest a best move and evaluate a position
//! - [`UciEngine`] - an [`Analyzer`] backed by a UCI engine process such as Stockfish
//! - [`Evaluation`] - position evaluation (centipawn or mate score)
//!
//! The engine is treated as optional: every failure surfaces as an
//! [`EngineError`] that callers can recover from.
//!
//! # Example
//!
//! ```no_run
//! use chess_analysis::{Analyzer, UciEngine};
//!
//! let mut engine = UciEngine::new("stockfish")?;
//! let analysis = engine.analyze("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 12)?;
//! println!("best move {} ({})", analysis.best_move, analysis.evaluation);
//! # Ok::<(), chess_analysis::EngineError>(())
//! ```

pub mod engine;
pub mod evaluation;

pub use engine::{Analyzer, EngineError, PositionAnalysis, UciEngine, MAX_UCI_LINES};
pub use evaluation::Evaluation;
