//! UCI engine process wrapper for position analysis.

use crate::Evaluation;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Maximum number of lines to read before giving up on a UCI response.
pub const MAX_UCI_LINES: usize = 1000;

/// Errors that can occur when working with an analysis engine.
///
/// None of these are fatal to a game; callers fall back to playing or
/// displaying without an evaluation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine executable was not found at the specified path.
    #[error("engine not found at path: {0}")]
    NotFound(String),
    /// Failed to spawn or talk to the engine process.
    #[error("engine I/O failed: {0}")]
    Spawn(#[from] io::Error),
    /// Engine failed to initialize properly (UCI handshake failed).
    #[error("engine initialization failed")]
    InitFailed,
    /// Engine returned an invalid or unexpected response.
    #[error("invalid engine response: {0}")]
    InvalidResponse(String),
}

impl EngineError {
    /// Returns true if the engine is missing or could not be started, as
    /// opposed to a running engine that answered badly.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            EngineError::NotFound(_) | EngineError::Spawn(_) | EngineError::InitFailed
        )
    }
}

/// Result of analyzing a chess position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionAnalysis {
    /// The best move found (in UCI notation, e.g., "e2e4").
    pub best_move: String,
    /// The position evaluation, from the side to move's point of view.
    pub evaluation: Evaluation,
    /// The search depth reached.
    pub depth: u32,
    /// The number of nodes searched.
    pub nodes: u64,
    /// The principal variation (sequence of best moves).
    pub pv: Vec<String>,
}

/// Something that can suggest a move and evaluate a position.
///
/// Implementations may be slow or fail at any time.
pub trait Analyzer {
    /// Analyzes the position described by `fen` to the given search depth.
    fn analyze(&mut self, fen: &str, depth: u32) -> Result<PositionAnalysis, EngineError>;
}

/// Fields of a single `info` line.
#[derive(Debug, PartialEq, Eq)]
struct InfoLine {
    depth: u32,
    evaluation: Evaluation,
    nodes: u64,
    pv: Vec<String>,
}

/// Wrapper for UCI-compatible analysis engines like Stockfish.
///
/// The engine process lives as long as this value and is asked to quit on
/// drop.
pub struct UciEngine {
    /// The engine process handle.
    process: Child,
    /// Writer for sending commands to the engine.
    stdin: ChildStdin,
    /// Reader for receiving responses from the engine.
    stdout: BufReader<ChildStdout>,
    /// The engine's name (reported via UCI id).
    name: String,
}

impl UciEngine {
    /// Spawns the engine and performs the UCI handshake.
    ///
    /// `engine_path` may be a bare command name, which is looked up on `PATH`.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotFound` if the executable does not exist
    /// - `EngineError::Spawn` if the process fails to start
    /// - `EngineError::InitFailed` if UCI initialization fails
    pub fn new(engine_path: &str) -> Result<Self, EngineError> {
        let looks_like_path = engine_path.contains(std::path::MAIN_SEPARATOR);
        if looks_like_path && !Path::new(engine_path).exists() {
            return Err(EngineError::NotFound(engine_path.to_string()));
        }

        let mut process = Command::new(engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => EngineError::NotFound(engine_path.to_string()),
                _ => EngineError::Spawn(e),
            })?;

        let stdin = process.stdin.take().ok_or(EngineError::InitFailed)?;
        let stdout = process.stdout.take().ok_or(EngineError::InitFailed)?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            name: String::new(),
        };

        if let Err(e) = engine.init_uci() {
            warn!(path = engine_path, error = %e, "engine handshake failed");
            return Err(e);
        }
        debug!(path = engine_path, name = %engine.name, "engine ready");

        Ok(engine)
    }

    /// Initialize the UCI protocol with the engine.
    fn init_uci(&mut self) -> Result<(), EngineError> {
        self.send_command("uci")?;

        let mut name = String::new();
        for _ in 0..MAX_UCI_LINES {
            let line = self.read_line()?;
            if let Some(id) = line.strip_prefix("id name ") {
                name = id.to_string();
            } else if line == "uciok" {
                self.name = if name.is_empty() {
                    "Unknown Engine".to_string()
                } else {
                    name
                };
                return self.wait_ready();
            }
        }
        Err(EngineError::InitFailed)
    }

    /// Sends `isready` and waits for `readyok`.
    fn wait_ready(&mut self) -> Result<(), EngineError> {
        self.send_command("isready")?;
        for _ in 0..MAX_UCI_LINES {
            if self.read_line()? == "readyok" {
                return Ok(());
            }
        }
        Err(EngineError::InitFailed)
    }

    /// Returns the engine's name as reported via UCI protocol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Analyze a position given in FEN notation.
    pub fn analyze_fen(&mut self, fen: &str, depth: u32) -> Result<PositionAnalysis, EngineError> {
        self.send_command(&format!("position fen {}", fen))?;
        self.run_analysis(depth)
    }

    /// Clear the engine's hash tables and prepare for a new game.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.send_command("ucinewgame")?;
        self.wait_ready()
    }

    /// Run the analysis for the current position.
    fn run_analysis(&mut self, depth: u32) -> Result<PositionAnalysis, EngineError> {
        self.send_command(&format!("go depth {}", depth))?;

        let mut latest: Option<InfoLine> = None;
        for _ in 0..MAX_UCI_LINES {
            let line = self.read_line()?;

            if line.starts_with("info ") {
                if let Some(info) = parse_info_line(&line) {
                    latest = Some(info);
                }
            } else if let Some(rest) = line.strip_prefix("bestmove") {
                // "bestmove e2e4 ponder e7e5"
                let best_move = rest
                    .split_whitespace()
                    .next()
                    .filter(|m| *m != "(none)")
                    .ok_or_else(|| {
                        EngineError::InvalidResponse("no best move received".to_string())
                    })?
                    .to_string();

                let info = latest.unwrap_or(InfoLine {
                    depth: 0,
                    evaluation: Evaluation::Centipawns(0),
                    nodes: 0,
                    pv: Vec::new(),
                });
                return Ok(PositionAnalysis {
                    best_move,
                    evaluation: info.evaluation,
                    depth: info.depth,
                    nodes: info.nodes,
                    pv: info.pv,
                });
            }
        }

        Err(EngineError::InvalidResponse(
            "too many lines without bestmove".to_string(),
        ))
    }

    /// Send a command to the engine.
    fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        trace!(command, "engine <");
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Read a line from the engine's output.
    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        let bytes = self.stdout.read_line(&mut line)?;
        if bytes == 0 {
            return Err(EngineError::InvalidResponse(
                "engine closed unexpectedly".to_string(),
            ));
        }
        let line = line.trim().to_string();
        trace!(line = %line, "engine >");
        Ok(line)
    }
}

impl Analyzer for UciEngine {
    fn analyze(&mut self, fen: &str, depth: u32) -> Result<PositionAnalysis, EngineError> {
        let analysis = self.analyze_fen(fen, depth)?;
        debug!(
            fen,
            best_move = %analysis.best_move,
            evaluation = %analysis.evaluation,
            depth = analysis.depth,
            "analysis finished"
        );
        Ok(analysis)
    }
}

impl Drop for UciEngine {
    /// Asks the engine to quit, then kills and reaps it so a process that
    /// ignores `quit` cannot block the drop.
    fn drop(&mut self) {
        let _ = self.send_command("quit");
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Parse a UCI info line to extract depth, score, nodes, and PV.
///
/// Format: "info depth X score cp Y nodes Z pv move1 move2 ..."
/// or: "info depth X score mate Y nodes Z pv move1 move2 ..."
///
/// Lines without a depth or a score (e.g. `info string ...`) yield `None`.
fn parse_info_line(line: &str) -> Option<InfoLine> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let mut depth: Option<u32> = None;
    let mut cp: Option<i32> = None;
    let mut mate: Option<i32> = None;
    let mut nodes: u64 = 0;
    let mut pv: Vec<String> = Vec::new();

    let mut i = 0;
    while i < parts.len() {
        match (parts[i], parts.get(i + 1)) {
            ("depth", Some(value)) => {
                depth = value.parse().ok();
                i += 1;
            }
            ("score", Some(&"cp")) => {
                cp = parts.get(i + 2).and_then(|v| v.parse().ok());
                i += 2;
            }
            ("score", Some(&"mate")) => {
                mate = parts.get(i + 2).and_then(|v| v.parse().ok());
                i += 2;
            }
            ("nodes", Some(value)) => {
                nodes = value.parse().unwrap_or(0);
                i += 1;
            }
            ("pv", _) => {
                pv = parts[i + 1..].iter().map(|m| m.to_string()).collect();
                break;
            }
            _ => {}
        }
        i += 1;
    }

    Some(InfoLine {
        depth: depth?,
        evaluation: Evaluation::from_uci_score(cp, mate)?,
        nodes,
        pv,
    })
}
