//! Bitboard chess engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets
//! - [`Position`] - Board state with reversible apply/undo and Zobrist hashing
//! - Legal move generation over magic-bitboard attack tables, plus perft
//! - [`TranspositionTable`] - Lock-free table shared between search threads
//! - [`Engine`] - Iterative-deepening alpha-beta search on worker threads
//!
//! # Architecture
//!
//! Each piece type/color combination has its own bitboard, mirrored by a
//! square-indexed mailbox for piece lookup. Moves carry the moved and
//! captured pieces, so [`Position::undo`] restores the exact prior state.
//!
//! # Example
//!
//! ```
//! use chess_engine::{generate_moves, Engine, EngineConfig, Position, SearchParams};
//!
//! let mut position = Position::startpos();
//! println!("Legal moves from starting position: {}", generate_moves(&mut position).len());
//!
//! let mut engine = Engine::new(EngineConfig::default()).unwrap();
//! engine.position_mut().apply_moves(["e2e4", "e7e5"]).unwrap();
//! let result = engine.search(&SearchParams::depth(4)).unwrap();
//! println!("Best reply: {}", result.best_move);
//! ```

mod bitboard;
mod config;
mod engine;
mod error;
pub mod eval;
pub mod movegen;
mod position;
pub mod search;
pub mod tt;
mod zobrist;

pub use bitboard::Bitboard;
pub use config::EngineConfig;
pub use engine::{Engine, StopHandle};
pub use error::{ConfigError, EngineError, PositionError};
pub use eval::{evaluate, EvalCache, EvalFn};
pub use movegen::perft::{perft, perft_divide, perft_parallel};
pub use movegen::{generate_captures, generate_moves, is_square_attacked, MoveList};
pub use position::{Position, HISTORY_CAPACITY};
pub use search::time::{Clock, SearchParams};
pub use search::{SearchResult, SearchStats, MATE};
pub use tt::{Bound, TranspositionTable, TtEntry};
pub use zobrist::{ZobristKeys, ZOBRIST};
