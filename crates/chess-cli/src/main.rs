use anyhow::{Context, Result};
use chess_analysis::UciEngine;
use chess_cli::{
    CliConfig, EnginePolicy, Flow, MovePolicy, OpponentKind, RandomPolicy, Session, SharedAnalyzer,
    Side,
};
use chess_engine::Game;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-cli")]
#[command(about = "Play chess in the terminal")]
struct Args {
    /// Configuration file; missing files fall back to defaults
    #[arg(short, long, default_value_os_t = CliConfig::default_path())]
    config: PathBuf,
    /// Starting position in FEN
    #[arg(long)]
    fen: Option<String>,
    /// Side you play against the opponent
    #[arg(long, value_enum)]
    play_as: Option<Side>,
    /// Who answers your moves
    #[arg(long, value_enum)]
    opponent: Option<OpponentKind>,
    /// UCI engine executable for `eval` and the engine opponent
    #[arg(long)]
    engine_path: Option<String>,
    /// Search depth for engine queries
    #[arg(short, long)]
    depth: Option<u32>,
    /// Seed for the random opponent
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    /// Applies command-line overrides on top of the file configuration.
    fn merge(self, mut config: CliConfig) -> CliConfig {
        if self.fen.is_some() {
            config.start_fen = self.fen;
        }
        if let Some(side) = self.play_as {
            config.play_as = side;
        }
        if let Some(opponent) = self.opponent {
            config.opponent = opponent;
        }
        if let Some(path) = self.engine_path {
            config.engine_path = path;
        }
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config
    }
}

fn random_policy(seed: Option<u64>) -> RandomPolicy {
    match seed {
        Some(seed) => RandomPolicy::seeded(seed),
        None => RandomPolicy::new(),
    }
}

/// Starts the analysis engine once; the opponent and `eval` share it.
fn start_engine(config: &CliConfig) -> Option<SharedAnalyzer<UciEngine>> {
    match UciEngine::new(&config.engine_path) {
        Ok(engine) => {
            info!(engine = engine.name(), "analysis engine ready");
            Some(SharedAnalyzer::new(engine))
        }
        Err(e) => {
            info!(error = %e, path = %config.engine_path, "no analysis engine, eval disabled");
            None
        }
    }
}

fn opponent(
    config: &CliConfig,
    engine: Option<&SharedAnalyzer<UciEngine>>,
) -> Option<Box<dyn MovePolicy>> {
    match (config.opponent, engine) {
        (OpponentKind::Nobody, _) => None,
        (OpponentKind::Random, _) => Some(Box::new(random_policy(config.seed))),
        (OpponentKind::Engine, Some(engine)) => Some(Box::new(EnginePolicy::new(
            engine.clone(),
            config.depth,
            random_policy(config.seed),
        ))),
        (OpponentKind::Engine, None) => {
            warn!(path = %config.engine_path, "engine opponent unavailable, playing random moves");
            Some(Box::new(random_policy(config.seed)))
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let file_config = CliConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let config = args.merge(file_config);

    let game = match &config.start_fen {
        Some(fen) => Game::from_fen(fen).with_context(|| format!("starting position {fen}"))?,
        None => Game::new(),
    };

    let stdout = io::stdout();
    let mut session = Session::new(game, stdout.lock());
    let engine = start_engine(&config);
    if let Some(policy) = opponent(&config, engine.as_ref()) {
        session = session.with_opponent(policy, config.play_as.into());
    }
    if let Some(engine) = engine {
        session = session.with_analyzer(Box::new(engine), config.depth);
    }

    session.start()?;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading input")?;
        if session.handle(&line)? == Flow::Quit {
            break;
        }
    }
    session.into_output().flush()?;
    Ok(())
}
