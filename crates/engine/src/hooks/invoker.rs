//! Hook invoker
//!
//! One entry point for both compile hooks: locate the script, ask the runtime
//! to load it, call the hook if the module has it.

use kiln_core::{
    CompileHook, ExtensionModule, HookArgs, HookOutcome, HookRequest, OutputMode, Result,
    ScriptRuntime,
};
use std::path::{Path, PathBuf};

/// Invokes compile hooks through a [`ScriptRuntime`]
///
/// # Examples
///
/// ```ignore
/// let invoker = HookInvoker::new(PythonRuntime::detect(None)?);
/// invoker.invoke(Path::new("scripts/foo.py"), CompileHook::PostCompile, &args)?;
/// ```
#[derive(Debug)]
pub struct HookInvoker<R> {
    runtime: R,
    output: OutputMode,
    working_dir: Option<PathBuf>,
}

impl<R: ScriptRuntime> HookInvoker<R> {
    /// Create an invoker that shares the caller's output and directory
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            output: OutputMode::Inherit,
            working_dir: None,
        }
    }

    /// Set where the extension's output goes
    #[must_use]
    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Run hooks from a fixed working directory
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Locate `script` and run its `hook` with `args`
    ///
    /// # Errors
    ///
    /// - [`kiln_core::Error::ModuleNotFound`] if `script` is not a loadable module
    /// - [`kiln_core::Error::HookFailed`] if the extension raises
    pub fn invoke(&self, script: &Path, hook: CompileHook, args: &HookArgs) -> Result<HookOutcome> {
        let module = ExtensionModule::locate(script)?;
        self.invoke_module(&module, hook, args)
    }

    /// Run `hook` of an already located module
    ///
    /// # Errors
    ///
    /// Same as [`HookInvoker::invoke`].
    #[tracing::instrument(skip(self, module, args), fields(script = %module.path().display(), hook = %hook))]
    pub fn invoke_module(
        &self,
        module: &ExtensionModule,
        hook: CompileHook,
        args: &HookArgs,
    ) -> Result<HookOutcome> {
        let mut request = HookRequest::new(module, hook, args).output(self.output);
        if let Some(dir) = &self.working_dir {
            request = request.working_dir(dir);
        }

        tracing::debug!(runtime = self.runtime.name(), module = module.name(), "Invoking hook");

        let outcome = self.runtime.invoke(&request)?;
        match outcome {
            HookOutcome::Invoked => tracing::debug!("Hook completed"),
            HookOutcome::Absent => tracing::debug!("Module does not define the hook"),
        }

        Ok(outcome)
    }
}
