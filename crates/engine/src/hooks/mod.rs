//! Compile hook system
//!
//! Loads user extension scripts and calls their `pre_compile` /
//! `post_compile` hooks.
//!
//! ## Execution Model
//!
//! - One invoker serves both hooks; the hook name is a parameter
//! - A missing script is an error, a missing hook is a no-op
//! - Failures inside the extension propagate to the caller untouched
//! - Configured scripts of a stage run sequentially in list order
//!
//! ## Module Organization
//!
//! - `invoker`: locate a script and dispatch one hook through a runtime
//! - `python`: the Python interpreter runtime and its bootstrap program
//! - `steps`: run the scripts listed in `kiln.toml` for a stage

pub mod invoker;
pub mod python;
pub mod steps;

// Re-export main types for convenience
pub use invoker::HookInvoker;
pub use python::PythonRuntime;
pub use steps::{BuildContext, CompileScripts, StepReport};
