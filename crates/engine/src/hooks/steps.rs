//! Compile script steps
//!
//! Runs every script configured for a stage with the build context as hook
//! arguments: `(target directory, project directory, level name)`.

use super::invoker::HookInvoker;
use kiln_config::ScriptsConfig;
use kiln_core::{CompileHook, Error, HookArgs, HookOutcome, OutputMode, Result, ScriptRuntime};
use std::path::{Path, PathBuf};

/// What a compile produces and for which level
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Directory the compile writes into
    pub target: &'a Path,
    /// Name of the level being compiled
    pub name: &'a str,
}

/// Per-script results of one stage
#[derive(Debug)]
pub struct StepReport {
    /// Stage that ran
    pub hook: CompileHook,
    /// Scripts whose hook ran
    pub invoked: Vec<String>,
    /// Scripts that do not define the hook
    pub absent: Vec<String>,
    /// Scripts that failed (only filled when `continue_on_error` is set)
    pub failed: Vec<(String, Error)>,
}

impl StepReport {
    /// Report of a stage that has not run any script
    pub fn empty(hook: CompileHook) -> Self {
        Self {
            hook,
            invoked: Vec::new(),
            absent: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Check if every script succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of scripts the stage went through
    pub fn total(&self) -> usize {
        self.invoked.len() + self.absent.len() + self.failed.len()
    }
}

/// Runner for the scripts configured in `kiln.toml`
pub struct CompileScripts<'a, R> {
    scripts: &'a ScriptsConfig,
    project_dir: &'a Path,
    invoker: HookInvoker<R>,
}

impl<'a, R: ScriptRuntime> CompileScripts<'a, R> {
    /// Create a runner; scripts run from the project directory with their
    /// output forwarded to the log
    pub fn new(scripts: &'a ScriptsConfig, project_dir: &'a Path, runtime: R) -> Self {
        Self {
            scripts,
            project_dir,
            invoker: HookInvoker::new(runtime)
                .output(OutputMode::Capture)
                .working_dir(project_dir),
        }
    }

    /// Configured scripts of a stage with their resolved paths
    pub fn resolved(&self, hook: CompileHook) -> Vec<(&'a str, PathBuf)> {
        self.scripts
            .for_hook(hook)
            .iter()
            .map(|name| (name.as_str(), self.scripts.resolve(self.project_dir, name)))
            .collect()
    }

    /// Run all scripts of a stage in order
    ///
    /// # Errors
    ///
    /// Returns the first script failure unless `continue_on_error` is set, in
    /// which case failures are collected in the report.
    #[tracing::instrument(skip(self, context), fields(stage = hook.stage(), target = %context.target.display()))]
    pub fn run(&self, hook: CompileHook, context: &BuildContext<'_>) -> Result<StepReport> {
        let mut report = StepReport::empty(hook);
        let scripts = self.resolved(hook);

        if scripts.is_empty() {
            tracing::debug!("No scripts configured for stage");
            return Ok(report);
        }

        let args = HookArgs::new(
            context.target.display().to_string(),
            self.project_dir.display().to_string(),
            context.name,
        );

        tracing::debug!(count = scripts.len(), "Running compile scripts");

        for (name, path) in scripts {
            match self.invoker.invoke(&path, hook, &args) {
                Ok(HookOutcome::Invoked) => {
                    tracing::info!("Script {name} ran {hook}");
                    report.invoked.push(name.to_string());
                }
                Ok(HookOutcome::Absent) => {
                    tracing::info!("Script {name} has no {hook}");
                    report.absent.push(name.to_string());
                }
                Err(e) if self.scripts.continue_on_error => {
                    tracing::warn!(error = %e, "Script {name} failed, continuing");
                    report.failed.push((name.to_string(), e));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Script {name} failed");
                    return Err(e);
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::hooks::invoker::tests::RecordingRuntime;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_scripts(names: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("scripts");
        fs::create_dir_all(&dir).unwrap();
        for name in names {
            fs::write(dir.join(format!("{name}.py")), "").unwrap();
        }
        temp
    }

    fn scripts(pre: &[&str], post: &[&str]) -> ScriptsConfig {
        ScriptsConfig {
            pre_compile: pre.iter().map(ToString::to_string).collect(),
            post_compile: post.iter().map(ToString::to_string).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_stage_does_not_touch_runtime() {
        let temp = project_with_scripts(&[]);
        let config = scripts(&[], &["package"]);
        let runtime = RecordingRuntime::default();
        let runner = CompileScripts::new(&config, temp.path(), &runtime);

        let report = runner
            .run(
                CompileHook::PreCompile,
                &BuildContext {
                    target: Path::new("/out"),
                    name: "level",
                },
            )
            .unwrap();

        assert_eq!(report.total(), 0);
        assert!(runtime.calls.borrow().is_empty());
    }

    #[test]
    fn test_runs_scripts_in_order_with_build_context() {
        let temp = project_with_scripts(&["prepare", "stamp"]);
        let config = scripts(&["prepare", "stamp.py"], &[]);
        let runtime = RecordingRuntime::default();
        let runner = CompileScripts::new(&config, temp.path(), &runtime);

        let report = runner
            .run(
                CompileHook::PreCompile,
                &BuildContext {
                    target: Path::new("/out/world"),
                    name: "castle",
                },
            )
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.invoked, ["prepare", "stamp.py"]);

        let calls = runtime.calls.borrow();
        let modules: Vec<_> = calls.iter().map(|c| c.module.as_str()).collect();
        assert_eq!(modules, ["prepare", "stamp"]);

        let project = temp.path().display().to_string();
        assert_eq!(calls[0].args, ["/out/world", project.as_str(), "castle"]);
        assert_eq!(calls[0].output, OutputMode::Capture);
        assert_eq!(calls[0].working_dir.as_deref(), Some(temp.path()));
    }

    #[test]
    fn test_absent_hooks_are_reported() {
        let temp = project_with_scripts(&["a", "b"]);
        let config = scripts(&[], &["a", "b"]);
        let runtime = RecordingRuntime {
            absent: vec!["b"],
            ..Default::default()
        };
        let runner = CompileScripts::new(&config, temp.path(), &runtime);

        let report = runner
            .run(
                CompileHook::PostCompile,
                &BuildContext {
                    target: Path::new("/out"),
                    name: "level",
                },
            )
            .unwrap();

        assert_eq!(report.hook, CompileHook::PostCompile);
        assert_eq!(report.invoked, ["a"]);
        assert_eq!(report.absent, ["b"]);
    }

    #[test]
    fn test_first_failure_stops_stage() {
        let temp = project_with_scripts(&["a", "b", "c"]);
        let config = scripts(&["a", "b", "c"], &[]);
        let runtime = RecordingRuntime {
            failing: vec!["b"],
            ..Default::default()
        };
        let runner = CompileScripts::new(&config, temp.path(), &runtime);

        let err = runner
            .run(
                CompileHook::PreCompile,
                &BuildContext {
                    target: Path::new("/out"),
                    name: "level",
                },
            )
            .unwrap_err();

        assert!(matches!(err, Error::HookFailed { .. }));
        assert_eq!(runtime.calls.borrow().len(), 2);
    }

    #[test]
    fn test_continue_on_error_collects_failures() {
        let temp = project_with_scripts(&["a", "c"]);
        let mut config = scripts(&["a", "missing", "c"], &[]);
        config.continue_on_error = true;
        let runtime = RecordingRuntime::default();
        let runner = CompileScripts::new(&config, temp.path(), &runtime);

        let report = runner
            .run(
                CompileHook::PreCompile,
                &BuildContext {
                    target: Path::new("/out"),
                    name: "level",
                },
            )
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.invoked, ["a", "c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "missing");
        assert!(matches!(report.failed[0].1, Error::ModuleNotFound { .. }));
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_resolved_paths() {
        let temp = project_with_scripts(&[]);
        let config = scripts(&["gen"], &["pack.py"]);
        let runtime = RecordingRuntime::default();
        let runner = CompileScripts::new(&config, temp.path(), &runtime);

        assert_eq!(
            runner.resolved(CompileHook::PreCompile),
            [("gen", temp.path().join("scripts").join("gen.py"))]
        );
        assert_eq!(
            runner.resolved(CompileHook::PostCompile),
            [("pack.py", temp.path().join("scripts").join("pack.py"))]
        );
    }
}
