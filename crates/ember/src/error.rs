//! # Game Error Types
//!
//! Failures while loading configuration or level files, or while spawning a
//! level into the registry.

use std::path::PathBuf;

use ember_core::EcsError;
use thiserror::Error;

/// Errors that can occur in the game layer.
#[derive(Error, Debug)]
pub enum GameError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A TOML document did not match the expected shape.
    #[error("malformed TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The level parsed but describes something the engine cannot build.
    #[error("invalid level: {0}")]
    InvalidLevel(String),

    /// The registry rejected an operation while spawning.
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// Result type for game-layer operations.
pub type GameResult<T> = Result<T, GameError>;

pub(crate) fn read_file(path: &std::path::Path) -> GameResult<String> {
    std::fs::read_to_string(path).map_err(|source| GameError::Io {
        path: path.to_path_buf(),
        source,
    })
}
