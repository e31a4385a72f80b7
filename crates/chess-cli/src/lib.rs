//! Terminal turn driver for the chess engine.
//!
//! - [`config`] - TOML configuration with command-line overrides
//! - [`policy`] - how the opponent picks its moves
//! - [`session`] - the line-oriented command interpreter

pub mod config;
pub mod policy;
pub mod session;

pub use config::{CliConfig, ConfigError, OpponentKind, Side};
pub use policy::{EnginePolicy, MovePolicy, RandomPolicy, SharedAnalyzer};
pub use session::{Flow, Session};
