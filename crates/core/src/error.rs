//! Base error types for kiln
//!
//! This module provides the error type shared by every kiln crate.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The script path does not resolve to a loadable module
    #[error("Unable to find script: {}", path.display())]
    ModuleNotFound {
        /// Script path as the caller gave it
        path: PathBuf,
    },

    /// The extension raised while loading or while running the hook
    #[error("{hook} hook in {} failed{}", script.display(), exit_suffix(*code))]
    HookFailed {
        /// Hook attribute name
        hook: &'static str,
        /// Script that defined the hook
        script: PathBuf,
        /// Interpreter exit status, `None` when killed by a signal
        code: Option<i32>,
    },

    /// No usable interpreter
    #[error("Interpreter not found: {0}")]
    InterpreterNotFound(String),

    /// The hook ran past its time limit
    #[error("{hook} hook in {} timed out after {seconds} seconds", script.display())]
    Timeout {
        /// Hook attribute name
        hook: &'static str,
        /// Script that defined the hook
        script: PathBuf,
        /// Limit that was exceeded
        seconds: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

fn exit_suffix(code: Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => " (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Create a `ModuleNotFound` error for a script path
    pub fn module_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ModuleNotFound { path: path.into() }
    }

    /// Process exit status that reports this error to the calling build step
    ///
    /// A failed hook hands back the interpreter's own status so the caller
    /// sees exactly what the extension produced.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HookFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
