//! Error types for the CLI application.
//!
//! Every fallible command handler returns `Result<(), CliError>`, which the
//! dispatcher maps to a process exit code.

use std::fmt;

use doudizhu_engine::errors::{LedgerError, PlayError, ResumeError, SetupError};

/// Custom error type for CLI operations.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Engine-related error (ledger, replay, setup)
    Engine(String),

    /// Operation was interrupted (e.g., EOF on stdin)
    Interrupted(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
            CliError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<LedgerError> for CliError {
    fn from(error: LedgerError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<SetupError> for CliError {
    fn from(error: SetupError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<PlayError> for CliError {
    fn from(error: PlayError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<ResumeError> for CliError {
    fn from(error: ResumeError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl CliError {
    /// Process exit code for this error: 130 for interruptions, 2 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Interrupted(_) => 130,
            _ => 2,
        }
    }
}
