//! Core types and utilities for kiln
//!
//! This is the foundation crate that all other kiln crates depend on.
//! It provides:
//! - The shared error type
//! - Hook vocabulary (hook names, arguments, outcomes)
//! - Extension module location
//! - Platform detection
//! - The [`ScriptRuntime`] seam between the invoker and a concrete loader
//!
//! This crate has no dependencies on other kiln crates.

pub mod error;
pub mod hook;
pub mod module;
pub mod platform;
pub mod traits;

pub use error::{Error, Result};
pub use hook::{CompileHook, HookArgs, HookOutcome, OutputMode};
pub use module::ExtensionModule;
pub use traits::{HookRequest, ScriptRuntime};
