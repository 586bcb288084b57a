//! Hook shim commands
//!
//! `kiln pre-compile` and `kiln post-compile` are what the build pipeline
//! calls: load one script, run one hook with three opaque arguments.

use clap::Args;
use kiln_core::{CompileHook, ExtensionModule, HookArgs, HookOutcome};
use kiln_engine::HookInvoker;
use std::path::PathBuf;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Arguments shared by both shim commands
///
/// Everything after the subcommand is taken verbatim: hook arguments such as
/// `-h`, `--` or `-v` belong to the hook, not to kiln.
#[derive(Debug, Clone, Args)]
pub struct InvokeArgs {
    /// Extension script followed by the three hook arguments
    #[arg(
        value_names = ["SCRIPT", "ARG1", "ARG2", "ARG3"],
        num_args = 4,
        required = true,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    pub raw: Vec<String>,
}

impl InvokeArgs {
    /// Build shim arguments from a script and three hook arguments
    pub fn new(
        script: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
        third: impl Into<String>,
    ) -> Self {
        Self {
            raw: vec![script.into(), first.into(), second.into(), third.into()],
        }
    }

    /// Script path and hook arguments
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly a script and three arguments are held.
    pub fn split(&self) -> Result<(PathBuf, HookArgs)> {
        match self.raw.as_slice() {
            [script, first, second, third] => Ok((
                PathBuf::from(script),
                HookArgs::new(first.as_str(), second.as_str(), third.as_str()),
            )),
            other => Err(kiln_core::Error::Message(format!(
                "Expected a script and 3 hook arguments, got {} values",
                other.len()
            ))
            .into()),
        }
    }
}

/// Run one hook of one script
#[derive(Debug)]
pub struct InvokeCommand<'a> {
    hook: CompileHook,
    args: &'a InvokeArgs,
}

impl<'a> InvokeCommand<'a> {
    /// Bind shim arguments to a hook
    pub fn new(hook: CompileHook, args: &'a InvokeArgs) -> Self {
        Self { hook, args }
    }
}

impl Command for InvokeCommand<'_> {
    type Output = HookOutcome;

    fn execute(&self, context: &RuntimeContext) -> Result<HookOutcome> {
        let (script, hook_args) = self.args.split()?;

        // Locate first: a missing script must be reported even without Python
        let module = ExtensionModule::locate(&script)?;
        let runtime = context.runtime()?;

        let outcome = HookInvoker::new(runtime).invoke_module(&module, self.hook, &hook_args)?;
        tracing::debug!(?outcome, "Shim finished");
        Ok(outcome)
    }
}
