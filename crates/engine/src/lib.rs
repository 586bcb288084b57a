//! # Kiln Engine
//!
//! Hook execution for the kiln compile hook invoker.
//!
//! - **Invoker**: locate an extension script and call one of its hooks
//! - **Python runtime**: run extensions in an external Python interpreter
//! - **Compile steps**: run the scripts a project configures for each stage

pub mod hooks;

// Re-export error types from core
pub use kiln_core::{Error, Result};

// Re-export commonly used types
pub use hooks::{BuildContext, CompileScripts, HookInvoker, PythonRuntime, StepReport};
