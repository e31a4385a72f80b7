//! Configuration file loading for the terminal driver.
//!
//! Settings come from an optional TOML file; command-line flags override
//! them in `main`.

use chess_core::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// The side the person at the terminal plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// Who answers the person's moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OpponentKind {
    /// A uniformly random legal move.
    #[default]
    Random,
    /// The analysis engine's best move, falling back to random.
    Engine,
    /// Nobody; both sides are entered at the terminal.
    #[serde(rename = "none")]
    #[value(name = "none")]
    Nobody,
}

/// Driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// Starting position; the standard start when absent.
    pub start_fen: Option<String>,
    /// Side played at the terminal.
    pub play_as: Side,
    /// Opponent policy.
    pub opponent: OpponentKind,
    /// UCI engine used for `eval` and the engine opponent.
    /// Defaults to "stockfish" (assumes it's in PATH).
    pub engine_path: String,
    /// Search depth for engine queries. Defaults to 12.
    pub depth: u32,
    /// Seed for the random opponent; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            start_fen: None,
            play_as: Side::White,
            opponent: OpponentKind::Random,
            engine_path: "stockfish".to_string(),
            depth: 12,
            seed: None,
        }
    }
}

impl CliConfig {
    /// Loads the configuration from `path`.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Default configuration file: `chess.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from("chess.toml")
    }
}
