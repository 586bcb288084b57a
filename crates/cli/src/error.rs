//! Error types for CLI commands
//!
//! Library errors keep their identity here so `main` can pick the exit status
//! the build pipeline expects.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Error raised by the kiln library crates
    #[error(transparent)]
    Kiln(#[from] kiln_core::Error),

    /// A stage finished with failed scripts (`continue_on_error`)
    #[error("{stage} failed: {failed} out of {total} scripts")]
    StageFailed {
        /// Stage name
        stage: &'static str,
        /// Number of scripts that failed
        failed: usize,
        /// Number of scripts in the stage
        total: usize,
    },

    /// Invalid path error
    #[error("Invalid path: {}", path.display())]
    InvalidPath {
        /// The invalid path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Check if the error reports a script that could not be found
    pub fn is_module_not_found(&self) -> bool {
        matches!(self, Self::Kiln(kiln_core::Error::ModuleNotFound { .. }))
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Kiln(err) => err.exit_code(),
            _ => 1,
        }
    }
}
