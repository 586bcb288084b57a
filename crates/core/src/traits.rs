//! Core behavioral traits for kiln components
//!
//! The invoker only knows how to ask "run this hook of this module"; the
//! runtime behind [`ScriptRuntime`] decides how code actually gets loaded.
//! Depending on the trait keeps the invoker and the step runner testable
//! without an interpreter.

use crate::Result;
use crate::hook::{CompileHook, HookArgs, HookOutcome, OutputMode};
use crate::module::ExtensionModule;
use std::path::Path;

/// Everything a runtime needs for one hook call
#[derive(Debug, Clone, Copy)]
pub struct HookRequest<'a> {
    /// Located module to load
    pub module: &'a ExtensionModule,
    /// Hook to look up on the module
    pub hook: CompileHook,
    /// Arguments forwarded to the hook
    pub args: &'a HookArgs,
    /// Where the extension's output goes
    pub output: OutputMode,
    /// Working directory for the call (inherits the caller's when `None`)
    pub working_dir: Option<&'a Path>,
}

impl<'a> HookRequest<'a> {
    /// Build a request with inherited output and working directory
    pub fn new(module: &'a ExtensionModule, hook: CompileHook, args: &'a HookArgs) -> Self {
        Self {
            module,
            hook,
            args,
            output: OutputMode::Inherit,
            working_dir: None,
        }
    }

    /// Set the output mode
    #[must_use]
    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn working_dir(mut self, dir: &'a Path) -> Self {
        self.working_dir = Some(dir);
        self
    }
}

/// Loader and dispatcher for extension modules
///
/// # Examples
///
/// ```ignore
/// fn run(runtime: &dyn ScriptRuntime, request: &HookRequest<'_>) -> Result<()> {
///     match runtime.invoke(request)? {
///         HookOutcome::Invoked => println!("hook ran"),
///         HookOutcome::Absent => println!("nothing to do"),
///     }
///     Ok(())
/// }
/// ```
pub trait ScriptRuntime {
    /// Human readable name of the runtime (for logs)
    fn name(&self) -> &str;

    /// Load the module and call the requested hook if it exists
    ///
    /// # Errors
    ///
    /// - [`crate::Error::ModuleNotFound`] when the module cannot be loaded
    /// - [`crate::Error::HookFailed`] when loading or running the hook raises
    fn invoke(&self, request: &HookRequest<'_>) -> Result<HookOutcome>;
}

impl<T: ScriptRuntime + ?Sized> ScriptRuntime for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn invoke(&self, request: &HookRequest<'_>) -> Result<HookOutcome> {
        (**self).invoke(request)
    }
}
