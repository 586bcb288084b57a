//! Python script runtime
//!
//! Runs extension modules in an external Python interpreter. The interpreter
//! gets a small bootstrap program (`bootstrap.py`) that loads the module from
//! its file and calls the hook if the module defines it; the bootstrap reports
//! "module missing" and "hook absent" through reserved exit statuses.
//!
//! The module's directory reaches the interpreter through `PYTHONPATH` in the
//! child environment only, so nothing in this process changes.

use kiln_core::platform::CURRENT_PLATFORM;
use kiln_core::{Error, HookOutcome, HookRequest, OutputMode, Result, ScriptRuntime};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

/// Program handed to the interpreter with `-c`
const BOOTSTRAP: &str = include_str!("bootstrap.py");

/// Bootstrap exit status: the module itself could not be imported
pub const MODULE_NOT_FOUND_STATUS: i32 = 97;

/// Bootstrap exit status: the module has no callable hook attribute
pub const HOOK_ABSENT_STATUS: i32 = 98;

/// Module search path variable
const SEARCH_PATH_VAR: &str = "PYTHONPATH";

/// Tells the extension which hook it is running under
const HOOK_VAR: &str = "KILN_HOOK";

/// Python interpreter driven as a child process
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl PythonRuntime {
    /// Use a specific interpreter executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Build a runtime from an interpreter command line such as `"py -3"`
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be parsed or its program is not
    /// on `PATH`.
    pub fn from_command(command: &str) -> Result<Self> {
        let parts = shell_words::split(command).map_err(|e| {
            Error::Config(format!("Failed to parse interpreter command '{command}': {e}"))
        })?;

        let (program, args) = parts
            .split_first()
            .ok_or_else(|| Error::Config("Empty interpreter command".to_string()))?;

        let resolved =
            which::which(program).map_err(|_| Error::InterpreterNotFound(program.clone()))?;

        Ok(Self {
            program: resolved,
            args: args.to_vec(),
            timeout: None,
        })
    }

    /// Find an interpreter
    ///
    /// An explicit `preferred` command wins; otherwise the platform's usual
    /// interpreter names are searched on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InterpreterNotFound`] if nothing usable is found.
    pub fn detect(preferred: Option<&str>) -> Result<Self> {
        if let Some(command) = preferred {
            tracing::debug!(command, "Using configured interpreter");
            return Self::from_command(command);
        }

        let candidates = CURRENT_PLATFORM.python_candidates();
        for candidate in candidates {
            if let Ok(program) = which::which(candidate) {
                tracing::debug!(program = %program.display(), "Found interpreter on PATH");
                return Ok(Self::new(program));
            }
        }

        Err(Error::InterpreterNotFound(format!(
            "none of {} is on PATH",
            candidates.join(", ")
        )))
    }

    /// Limit how long a single hook may run
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Interpreter executable
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Ask the interpreter for its version
    ///
    /// Returns `None` if the program does not answer like a Python
    /// interpreter (older interpreters print the version on stderr).
    pub fn version(&self) -> Option<String> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push("--version".into());

        let output = duct::cmd(&self.program, &args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .ok()?;

        [&output.stdout, &output.stderr]
            .into_iter()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .find(|text| text.starts_with("Python"))
    }

    fn command_args(&self, request: &HookRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push("-c".into());
        args.push(BOOTSTRAP.into());
        args.push(request.module.name().into());
        args.push(request.module.path().into());
        args.push(request.hook.attr_name().into());
        args.extend(request.args.as_slice().iter().map(OsString::from));
        args
    }

    fn wait(&self, expression: &duct::Expression, request: &HookRequest<'_>) -> Result<Output> {
        let Some(limit) = self.timeout else {
            return expression.run().map_err(|e| self.spawn_error(e));
        };

        let handle = expression.start().map_err(|e| self.spawn_error(e))?;
        if let Some(output) = handle.wait_timeout(limit)? {
            return Ok(output.clone());
        }

        tracing::warn!(seconds = limit.as_secs(), "Hook timed out, killing interpreter");
        handle.kill()?;
        Err(Error::Timeout {
            hook: request.hook.attr_name(),
            script: request.module.path().to_path_buf(),
            seconds: limit.as_secs(),
        })
    }

    fn spawn_error(&self, err: std::io::Error) -> Error {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::InterpreterNotFound(self.program.display().to_string())
        } else {
            Error::Io(err)
        }
    }
}

impl ScriptRuntime for PythonRuntime {
    fn name(&self) -> &str {
        "python"
    }

    #[tracing::instrument(skip(self, request), fields(module = request.module.name(), hook = %request.hook))]
    fn invoke(&self, request: &HookRequest<'_>) -> Result<HookOutcome> {
        let inherited = std::env::var_os(SEARCH_PATH_VAR);
        let search_path = search_path(request.module.search_dir(), inherited.as_deref())?;
        let args = self.command_args(request);

        tracing::debug!(
            program = %self.program.display(),
            script = %request.module.path().display(),
            "Spawning interpreter"
        );

        let mut expression = duct::cmd(&self.program, &args)
            .env(SEARCH_PATH_VAR, &search_path)
            .env(HOOK_VAR, request.hook.attr_name())
            .unchecked();

        if let Some(dir) = request.working_dir {
            expression = expression.dir(dir);
        }

        if request.output == OutputMode::Capture {
            expression = expression.stdout_capture().stderr_capture();
        }

        let output = self.wait(&expression, request)?;

        if request.output == OutputMode::Capture {
            forward_output(&output);
        }

        outcome_from_status(request, output.status.code())
    }
}

/// Prepend the module directory to an inherited search path
///
/// Empty entries are dropped because Python reads them as the current
/// directory.
///
/// # Errors
///
/// Returns an error if the directory contains the platform's path separator.
pub fn search_path(module_dir: &Path, inherited: Option<&OsStr>) -> Result<OsString> {
    let mut entries = vec![module_dir.to_path_buf()];
    if let Some(existing) = inherited {
        entries.extend(std::env::split_paths(existing).filter(|p| !p.as_os_str().is_empty()));
    }

    std::env::join_paths(entries).map_err(|e| {
        Error::Message(format!(
            "Cannot add {} to {SEARCH_PATH_VAR}: {e}",
            module_dir.display()
        ))
    })
}

fn forward_output(output: &Output) {
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        tracing::info!("[python] {line}");
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        tracing::error!("Error executing Python script\n{}", stderr.trim_end());
    }
}

fn outcome_from_status(request: &HookRequest<'_>, code: Option<i32>) -> Result<HookOutcome> {
    match code {
        Some(0) => Ok(HookOutcome::Invoked),
        Some(HOOK_ABSENT_STATUS) => Ok(HookOutcome::Absent),
        Some(MODULE_NOT_FOUND_STATUS) => Err(Error::module_not_found(request.module.path())),
        code => Err(Error::HookFailed {
            hook: request.hook.attr_name(),
            script: request.module.path().to_path_buf(),
            code,
        }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use kiln_core::{CompileHook, ExtensionModule, HookArgs};
    use std::fs;
    use tempfile::TempDir;

    /// Interpreter for tests that need one; `None` skips the test
    fn python() -> Option<PythonRuntime> {
        match PythonRuntime::detect(None) {
            Ok(runtime) => Some(runtime),
            Err(e) => {
                eprintln!("skipping: {e}");
                None
            }
        }
    }

    fn write_module(dir: &Path, name: &str, source: &str) -> ExtensionModule {
        let path = dir.join(name);
        fs::write(&path, source).unwrap();
        ExtensionModule::locate(&path).unwrap()
    }

    #[test]
    fn test_search_path_prepends_module_dir() {
        let inherited = std::env::join_paths(["/opt/a", "/opt/b"]).unwrap();
        let joined = search_path(Path::new("/proj/scripts"), Some(&inherited)).unwrap();

        let entries: Vec<PathBuf> = std::env::split_paths(&joined).collect();
        assert_eq!(
            entries,
            [
                PathBuf::from("/proj/scripts"),
                PathBuf::from("/opt/a"),
                PathBuf::from("/opt/b")
            ]
        );
    }

    #[test]
    fn test_search_path_without_inherited_value() {
        let joined = search_path(Path::new("/proj/scripts"), None).unwrap();
        assert_eq!(joined, OsString::from("/proj/scripts"));
    }

    #[test]
    fn test_search_path_drops_empty_entries() {
        let joined = search_path(Path::new("/proj/scripts"), Some(OsStr::new(""))).unwrap();
        assert_eq!(joined, OsString::from("/proj/scripts"));
    }

    #[test]
    fn test_status_mapping() {
        let temp = TempDir::new().unwrap();
        let module = write_module(temp.path(), "foo.py", "");
        let args = HookArgs::new("a", "b", "c");
        let request = HookRequest::new(&module, CompileHook::PreCompile, &args);

        assert_eq!(
            outcome_from_status(&request, Some(0)).unwrap(),
            HookOutcome::Invoked
        );
        assert_eq!(
            outcome_from_status(&request, Some(HOOK_ABSENT_STATUS)).unwrap(),
            HookOutcome::Absent
        );
        assert!(matches!(
            outcome_from_status(&request, Some(MODULE_NOT_FOUND_STATUS)),
            Err(Error::ModuleNotFound { .. })
        ));
        assert!(matches!(
            outcome_from_status(&request, Some(1)),
            Err(Error::HookFailed { code: Some(1), .. })
        ));
        assert!(matches!(
            outcome_from_status(&request, None),
            Err(Error::HookFailed { code: None, .. })
        ));
    }

    #[test]
    fn test_command_args_layout() {
        let temp = TempDir::new().unwrap();
        let module = write_module(temp.path(), "foo.py", "");
        let args = HookArgs::new("x", "y", "z");
        let request = HookRequest::new(&module, CompileHook::PostCompile, &args);

        let mut runtime = PythonRuntime::new("python3");
        runtime.args = vec!["-X".into(), "utf8".into()];

        let built = runtime.command_args(&request);
        assert_eq!(built[0], "-X");
        assert_eq!(built[1], "utf8");
        assert_eq!(built[2], "-c");
        assert_eq!(built[3], BOOTSTRAP);
        assert_eq!(built[4], "foo");
        assert_eq!(built[5], module.path().as_os_str().to_os_string());
        assert_eq!(built[6..], ["post_compile", "x", "y", "z"]);
    }

    #[test]
    fn test_from_command_rejects_empty() {
        assert!(matches!(
            PythonRuntime::from_command("   "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_command_unknown_program() {
        assert!(matches!(
            PythonRuntime::from_command("kiln-no-such-interpreter --flag"),
            Err(Error::InterpreterNotFound(_))
        ));
    }

    #[test]
    fn test_version_reports_python() {
        let Some(runtime) = python() else { return };
        let version = runtime.version().unwrap();
        assert!(version.starts_with("Python "));
    }

    #[test]
    fn test_post_compile_writes_file() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out.txt");
        let module = write_module(
            temp.path(),
            "foo.py",
            "def post_compile(a, b, c):\n    open(b, 'w').write(a)\n",
        );
        let args = HookArgs::new("hello", out.display().to_string(), "ignored");

        let outcome = runtime
            .invoke(&HookRequest::new(&module, CompileHook::PostCompile, &args))
            .unwrap();

        assert_eq!(outcome, HookOutcome::Invoked);
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello");
    }

    #[test]
    fn test_arguments_arrive_in_order() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("args.txt");
        let module = write_module(
            temp.path(),
            "order.py",
            &format!(
                "def pre_compile(a, b, c):\n    open({:?}, 'a').write('|'.join([a, b, c]) + '\\n')\n",
                out.display().to_string()
            ),
        );
        let args = HookArgs::new("first", "second arg", "third");

        runtime
            .invoke(&HookRequest::new(&module, CompileHook::PreCompile, &args))
            .unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "first|second arg|third\n");
    }

    #[test]
    fn test_absent_hook_is_noop() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let module = write_module(
            temp.path(),
            "bar.py",
            "def post_compile(a, b, c):\n    raise RuntimeError('wrong hook')\n",
        );
        let args = HookArgs::new("x", "y", "z");

        let outcome = runtime
            .invoke(&HookRequest::new(&module, CompileHook::PreCompile, &args))
            .unwrap();
        assert_eq!(outcome, HookOutcome::Absent);
    }

    #[test]
    fn test_non_callable_attribute_is_absent() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let module = write_module(temp.path(), "flag.py", "pre_compile = True\n");
        let args = HookArgs::new("x", "y", "z");

        let outcome = runtime
            .invoke(&HookRequest::new(&module, CompileHook::PreCompile, &args))
            .unwrap();
        assert_eq!(outcome, HookOutcome::Absent);
    }

    #[test]
    fn test_raising_hook_fails() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let module = write_module(
            temp.path(),
            "boom.py",
            "def pre_compile(a, b, c):\n    raise ValueError(a)\n",
        );
        let args = HookArgs::new("x", "y", "z");

        let err = runtime
            .invoke(
                &HookRequest::new(&module, CompileHook::PreCompile, &args)
                    .output(OutputMode::Capture),
            )
            .unwrap_err();

        match err {
            Error::HookFailed { hook, code, .. } => {
                assert_eq!(hook, "pre_compile");
                assert_eq!(code, Some(1));
            }
            other => panic!("expected HookFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_dependency_is_hook_failure() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let module = write_module(
            temp.path(),
            "needs_dep.py",
            "import kiln_surely_not_installed\n",
        );
        let args = HookArgs::new("x", "y", "z");

        let err = runtime
            .invoke(
                &HookRequest::new(&module, CompileHook::PreCompile, &args)
                    .output(OutputMode::Capture),
            )
            .unwrap_err();
        assert!(matches!(err, Error::HookFailed { .. }));
    }

    #[test]
    fn test_module_removed_before_import_is_not_found() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let module = write_module(temp.path(), "gone.py", "");
        fs::remove_file(module.path()).unwrap();
        let args = HookArgs::new("x", "y", "z");

        let err = runtime
            .invoke(&HookRequest::new(&module, CompileHook::PreCompile, &args))
            .unwrap_err();
        assert!(matches!(err, Error::ModuleNotFound { .. }));
    }

    #[test]
    fn test_sibling_modules_are_importable() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("sibling.txt");
        fs::write(temp.path().join("helper.py"), "VALUE = 'from helper'\n").unwrap();
        let module = write_module(
            temp.path(),
            "main_hook.py",
            "import helper\n\ndef pre_compile(a, b, c):\n    open(a, 'w').write(helper.VALUE)\n",
        );
        let args = HookArgs::new(out.display().to_string(), "", "");

        runtime
            .invoke(&HookRequest::new(&module, CompileHook::PreCompile, &args))
            .unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "from helper");
    }

    #[test]
    fn test_script_shadowing_startup_module_is_loaded_from_file() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("site.txt");
        let module = write_module(
            temp.path(),
            "site.py",
            "def pre_compile(a, b, c):\n    open(a, 'w').write('mine')\n",
        );
        let args = HookArgs::new(out.display().to_string(), "", "");

        let outcome = runtime
            .invoke(&HookRequest::new(&module, CompileHook::PreCompile, &args))
            .unwrap();

        assert_eq!(outcome, HookOutcome::Invoked);
        assert_eq!(fs::read_to_string(&out).unwrap(), "mine");
    }

    #[test]
    fn test_dotted_file_name_is_loadable() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("dotted.txt");
        let module = write_module(
            temp.path(),
            "my.hooks.py",
            "def post_compile(a, b, c):\n    open(a, 'w').write(c)\n",
        );
        let args = HookArgs::new(out.display().to_string(), "", "third");

        let outcome = runtime
            .invoke(&HookRequest::new(&module, CompileHook::PostCompile, &args))
            .unwrap();

        assert_eq!(outcome, HookOutcome::Invoked);
        assert_eq!(fs::read_to_string(&out).unwrap(), "third");
    }

    #[test]
    fn test_hook_sees_working_dir_and_env() {
        let Some(runtime) = python() else { return };
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        fs::create_dir(&work).unwrap();
        let module = write_module(
            temp.path(),
            "where.py",
            "import os\n\ndef post_compile(a, b, c):\n    open('seen.txt', 'w').write(os.environ['KILN_HOOK'])\n",
        );
        let args = HookArgs::new("", "", "");

        runtime
            .invoke(
                &HookRequest::new(&module, CompileHook::PostCompile, &args).working_dir(&work),
            )
            .unwrap();
        assert_eq!(
            fs::read_to_string(work.join("seen.txt")).unwrap(),
            "post_compile"
        );
    }

    #[test]
    fn test_timeout_kills_hook() {
        let Some(runtime) = python() else { return };
        let runtime = runtime.with_timeout(Some(Duration::from_secs(1)));
        let temp = TempDir::new().unwrap();
        let module = write_module(
            temp.path(),
            "slow.py",
            "import time\n\ndef pre_compile(a, b, c):\n    time.sleep(30)\n",
        );
        let args = HookArgs::new("", "", "");

        let err = runtime
            .invoke(&HookRequest::new(&module, CompileHook::PreCompile, &args))
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { seconds: 1, .. }));
    }
}
