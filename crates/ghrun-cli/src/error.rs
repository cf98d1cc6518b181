//! Command errors.

use thiserror::Error;

/// Error returned by a command to `main`.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Bad invocation. Printed along with a usage hint.
    #[error("{0}")]
    Usage(String),

    /// Exit non-zero without printing anything. The rendered output already
    /// reports the failure.
    #[error("silent failure")]
    Silent,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        CommandError::Other(e.into())
    }
}

pub type CommandResult<T = ()> = std::result::Result<T, CommandError>;
