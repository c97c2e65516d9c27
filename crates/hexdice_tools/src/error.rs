//! Tool error types.

use std::path::PathBuf;

use hexdice_core::error::GameError;
use thiserror::Error;

/// Errors raised by the command-line tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file extension names no known format.
    #[error("unsupported file format: {0} (expected .ron or .json)")]
    UnsupportedFormat(PathBuf),

    /// RON parsing failed.
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON serialization failed.
    #[error("RON serialization error: {0}")]
    RonWrite(#[from] ron::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Map generation or validation failed in the core.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;
