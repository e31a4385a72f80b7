//! Opponent move selection.

use chess_analysis::{Analyzer, EngineError, PositionAnalysis};
use chess_core::Move;
use chess_engine::Game;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Picks a move for the side to move.
pub trait MovePolicy {
    /// Short name used in output.
    fn name(&self) -> &str;

    /// Chooses a legal move, or `None` when there is none.
    fn choose(&mut self, game: &Game) -> Option<Move>;
}

/// Plays a uniformly random legal move.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    /// Creates a policy seeded from the operating system.
    pub fn new() -> Self {
        RandomPolicy {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a policy with a fixed seed, for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        RandomPolicy {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl MovePolicy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose(&mut self, game: &Game) -> Option<Move> {
        game.legal_moves().as_slice().choose(&mut self.rng).copied()
    }
}

/// Plays the analysis engine's best move.
///
/// When the engine fails or suggests a move that is not legal here, the
/// policy logs a warning and plays a random legal move instead.
pub struct EnginePolicy<A: Analyzer> {
    analyzer: A,
    depth: u32,
    fallback: RandomPolicy,
}

impl<A: Analyzer> EnginePolicy<A> {
    /// Creates a policy that searches to `depth` and falls back to `fallback`.
    pub fn new(analyzer: A, depth: u32, fallback: RandomPolicy) -> Self {
        EnginePolicy {
            analyzer,
            depth,
            fallback,
        }
    }

    fn suggestion(&mut self, game: &Game) -> Option<Move> {
        let fen = game.to_fen();
        let analysis = match self.analyzer.analyze(&fen, self.depth) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "engine unavailable, playing a random move");
                return None;
            }
        };

        match Move::from_uci(&analysis.best_move) {
            Ok(m) if game.legal_moves().contains(&m) => {
                debug!(mv = %m, evaluation = %analysis.evaluation, "engine move");
                Some(m)
            }
            _ => {
                warn!(
                    best_move = %analysis.best_move,
                    fen = %fen,
                    "engine suggested an illegal move, playing a random move"
                );
                None
            }
        }
    }
}

impl<A: Analyzer> MovePolicy for EnginePolicy<A> {
    fn name(&self) -> &str {
        "engine"
    }

    fn choose(&mut self, game: &Game) -> Option<Move> {
        if game.is_game_over() {
            return None;
        }
        self.suggestion(game)
            .or_else(|| self.fallback.choose(game))
    }
}

/// One analyzer behind several handles, so the opponent and the `eval`
/// command can query the same engine process in turn.
pub struct SharedAnalyzer<A>(Rc<RefCell<A>>);

impl<A> SharedAnalyzer<A> {
    pub fn new(analyzer: A) -> Self {
        SharedAnalyzer(Rc::new(RefCell::new(analyzer)))
    }
}

impl<A> Clone for SharedAnalyzer<A> {
    fn clone(&self) -> Self {
        SharedAnalyzer(Rc::clone(&self.0))
    }
}

impl<A: Analyzer> Analyzer for SharedAnalyzer<A> {
    fn analyze(&mut self, fen: &str, depth: u32) -> Result<PositionAnalysis, EngineError> {
        self.0.borrow_mut().analyze(fen, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_analysis::Evaluation;

    /// Answers every query with a fixed move, or fails.
    struct ScriptedAnalyzer {
        answer: Option<&'static str>,
        calls: usize,
    }

    impl Analyzer for ScriptedAnalyzer {
        fn analyze(&mut self, _fen: &str, depth: u32) -> Result<PositionAnalysis, EngineError> {
            self.calls += 1;
            let best_move = self.answer.ok_or(EngineError::InitFailed)?;
            Ok(PositionAnalysis {
                best_move: best_move.to_string(),
                evaluation: Evaluation::Centipawns(25),
                depth,
                nodes: 1,
                pv: vec![best_move.to_string()],
            })
        }
    }

    fn engine_policy(answer: Option<&'static str>) -> EnginePolicy<ScriptedAnalyzer> {
        EnginePolicy::new(
            ScriptedAnalyzer { answer, calls: 0 },
            4,
            RandomPolicy::seeded(7),
        )
    }

    #[test]
    fn random_policy_plays_legal_moves() {
        let mut game = Game::new();
        let mut policy = RandomPolicy::seeded(1);
        for _ in 0..20 {
            let Some(m) = policy.choose(&game) else {
                break;
            };
            assert!(game.legal_moves().contains(&m));
            game.make_move(m).unwrap();
        }
    }

    #[test]
    fn random_policy_is_reproducible() {
        let game = Game::new();
        let first = RandomPolicy::seeded(99).choose(&game);
        let second = RandomPolicy::seeded(99).choose(&game);
        assert_eq!(first, second);
    }

    #[test]
    fn random_policy_has_nothing_in_stalemate() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(RandomPolicy::seeded(3).choose(&game), None);
    }

    #[test]
    fn engine_policy_plays_suggestion() {
        let game = Game::new();
        let mut policy = engine_policy(Some("g1f3"));
        assert_eq!(policy.choose(&game), Some(Move::from_uci("g1f3").unwrap()));
        assert_eq!(policy.analyzer.calls, 1);
    }

    #[test]
    fn engine_policy_falls_back_when_engine_fails() {
        let game = Game::new();
        let mut policy = engine_policy(None);
        let m = policy.choose(&game).unwrap();
        assert!(game.legal_moves().contains(&m));
    }

    #[test]
    fn engine_policy_rejects_illegal_suggestion() {
        let game = Game::new();
        let mut policy = engine_policy(Some("e2e5"));
        let m = policy.choose(&game).unwrap();
        assert_ne!(m, Move::from_uci("e2e5").unwrap());
        assert!(game.legal_moves().contains(&m));
    }

    #[test]
    fn engine_policy_skips_finished_games() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut policy = engine_policy(Some("h8g8"));
        assert_eq!(policy.choose(&game), None);
        assert_eq!(policy.analyzer.calls, 0);
    }

    #[test]
    fn shared_analyzer_handles_reach_one_engine() {
        let shared = SharedAnalyzer::new(ScriptedAnalyzer {
            answer: Some("e2e4"),
            calls: 0,
        });
        let mut eval_handle = shared.clone();
        let mut policy = EnginePolicy::new(shared.clone(), 4, RandomPolicy::seeded(1));

        let game = Game::new();
        assert_eq!(policy.choose(&game), Some(Move::from_uci("e2e4").unwrap()));
        eval_handle.analyze(&game.to_fen(), 4).unwrap();
        assert_eq!(shared.0.borrow().calls, 2);
    }
}
