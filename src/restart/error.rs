//! Error types for restart commands.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestartError {
    /// The command could not be started at all
    #[error("failed to spawn '{program}': {message}")]
    Spawn { program: String, message: String },

    /// The supervisor command ran and failed
    #[error("command exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    /// Issuing the command took longer than allowed
    #[error("command did not return within {0}s")]
    Timeout(u64),

    /// Restart template rendered to nothing
    #[error("restart command is empty")]
    EmptyCommand,
}
