//! # CLI Errors
//!
//! Everything that can stop a command: engine rejections plus the file,
//! parse and usage failures of the front end.

use memscore_core::ScoreError;
use thiserror::Error;

/// Errors surfaced by the `memscore` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// The engine rejected the request.
    #[error(transparent)]
    Score(#[from] ScoreError),

    /// A file could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// A JSON input file is malformed.
    #[error("JSON parse error in {path}: {reason}")]
    Json { path: String, reason: String },

    /// A TOML schema or config file is malformed.
    #[error("TOML parse error in {path}: {reason}")]
    Toml { path: String, reason: String },

    /// The command line is inconsistent.
    #[error("Invalid usage: {0}")]
    Usage(String),

    /// Output could not be rendered.
    #[error("Output error: {0}")]
    Output(String),
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
