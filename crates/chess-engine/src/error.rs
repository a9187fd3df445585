//! Error types for the engine crate.

use chess_core::{FenError, Square};
use std::io;
use thiserror::Error;

/// Errors raised when building or mutating a [`crate::Position`] from
/// external input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("invalid move notation: '{0}'")]
    InvalidMove(String),

    #[error("no piece on {0}")]
    NoPieceAt(Square),

    #[error("illegal move: '{0}'")]
    IllegalMove(String),
}

/// Errors raised while loading an [`crate::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("search worker disconnected")]
    WorkerDisconnected,

    #[error("failed to spawn search worker: {0}")]
    Spawn(#[source] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Position(#[from] PositionError),
}
