//! Error types for schoolscout.
//!
//! Library crates use [`ScoutError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all schoolscout operations.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration loading or validation error (missing keys, bad TOML).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during a page fetch.
    #[error("network error: {0}")]
    Network(String),

    /// Search-provider error (auth, transport, or response shape).
    #[error("provider error: {0}")]
    Provider(String),

    /// HTML parsing or signal extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Draft generation error.
    #[error("draft error: {0}")]
    Draft(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A requested lead does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Data validation error (invalid URL, malformed record, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
