//! Structured error types for spyglass
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Nothing here is fatal to a host process: persistence failures are
//! swallowed at the call site, replay failures abort only the replay, and
//! terminal failures abort only the TUI session.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("State file {0} holds something other than a JSON object")]
    NotAnObject(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Replay file {0} contains no envelopes")]
    Empty(String),

    #[error("Malformed envelope on line {line}: {source}")]
    Malformed { line: usize, source: serde_json::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Terminal error: {0}")]
    TerminalError(String),

    #[error("Invalid inspection document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
