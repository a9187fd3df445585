//! Core value types for chess.
//!
//! This crate provides the small, copyable types shared by the engine:
//! - [`Color`], [`PieceKind`] and the packed [`Piece`] tag
//! - [`Square`] indexing (a1 = 0 .. h8 = 63)
//! - [`CastlingRights`]
//! - the packed [`Move`] and [`CoordinateMove`] for long algebraic input
//! - FEN parsing and serialization via [`Fen`]

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castling::{CastlingRights, Wing};
pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{CoordinateMove, Move};
pub use piece::{Piece, PieceKind};
pub use square::{ParseSquareError, Square};
