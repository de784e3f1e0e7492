//! Error type for the tools.

use std::path::PathBuf;

use dominion_core::error::{ConfigError, GameError};
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Failures of the development tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Reading or writing a file failed.
    #[error("{path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The game core rejected an operation.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A config file was invalid.
    #[error("{path}: {source}")]
    Config {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: ConfigError,
    },

    /// JSON output could not be produced.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
