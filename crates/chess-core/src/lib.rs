//! Core types for chess.
//!
//! This crate provides the value types shared by the rules engine and its hosts:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] for move requests (origin, destination, optional promotion)
//! - [`FenParser`] for tokenizing and validating position descriptions

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::{Move, MoveParseError};
pub use piece::Piece;
pub use square::{File, Rank, Square};
