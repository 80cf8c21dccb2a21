//! Error types for the console driver
//!
//! Domain errors use thiserror; the untyped escape hatch for bugs that must
//! surface rather than be swallowed wraps `anyhow::Error`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level console error
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A driver or collaborator bug escaped the command loop. Deliberately
    /// rethrown so it is visible during development instead of silently
    /// dropped.
    #[error("internal console failure: {0}")]
    Internal(anyhow::Error),

    /// Reading a source file failed.
    #[error("failed to load {path}: {source}")]
    Load {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },

    /// Parsing a configuration file failed.
    #[error("configuration error: {0}")]
    Config(String),
}
