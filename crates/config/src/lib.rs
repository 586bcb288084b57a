//! Configuration management for kiln
//!
//! This crate handles:
//! - Loading and validating the project's `kiln.toml`
//! - Resolving configured script names to files
//! - Logging initialization

pub mod config;
pub mod logging;

// Re-export error types from core
pub use kiln_core::{Error, Result};

// Re-export main types
pub use config::{CONFIG_FILE_NAME, Config, InterpreterConfig, ScriptsConfig};
