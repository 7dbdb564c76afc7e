//! Error types for the lexbpe crates.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type shared by every lexbpe crate.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Error loading a vocabulary or word-count file
    #[error("Load error: {0}")]
    Load(String),

    /// Error saving a vocabulary, word counts or a checkpoint
    #[error("Save error: {0}")]
    Save(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The lexer rejected its input
    #[error("Lex error: {0}")]
    Lex(String),

    /// No lexer is available for the requested language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl TokenizerError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for lexbpe operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
