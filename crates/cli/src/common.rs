//! Common utilities and types shared across CLI commands

use crate::error::{CommandError, Result};
use kiln_config::{CONFIG_FILE_NAME, Config};
use kiln_engine::PythonRuntime;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Resolved project locations
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Absolute project root
    pub project_dir: PathBuf,
    /// Configuration file (may not exist)
    pub config_path: PathBuf,
}

impl ProjectPaths {
    /// Resolve the project root and the configuration file
    ///
    /// The project defaults to the current directory and the configuration to
    /// `<project>/kiln.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project directory does not exist.
    pub fn resolve(project: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        let project = project.unwrap_or_else(|| Path::new("."));
        let project_dir = std::path::absolute(project).map_err(|source| {
            CommandError::InvalidPath {
                path: project.to_path_buf(),
                source,
            }
        })?;

        if !project_dir.is_dir() {
            return Err(CommandError::InvalidPath {
                path: project_dir,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "project directory does not exist",
                ),
            });
        }

        let config_path = match config {
            Some(path) => std::path::absolute(path).map_err(|source| CommandError::InvalidPath {
                path: path.to_path_buf(),
                source,
            })?,
            None => project_dir.join(CONFIG_FILE_NAME),
        };

        Ok(Self {
            project_dir,
            config_path,
        })
    }

    /// Check if the configuration file is the project's default one
    pub fn uses_default_config(&self) -> bool {
        self.config_path == self.project_dir.join(CONFIG_FILE_NAME)
    }
}

/// Runtime context for CLI commands
#[derive(Clone)]
pub struct RuntimeContext {
    /// Loaded configuration (defaults when the file is absent)
    pub config: Arc<Config>,
    /// Resolved project locations
    pub paths: ProjectPaths,
    config_found: bool,
    python: Option<String>,
}

impl RuntimeContext {
    fn new(
        config: Config,
        paths: ProjectPaths,
        config_found: bool,
        python: Option<String>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            paths,
            config_found,
            python,
        }
    }

    /// Load the configuration for `paths`
    ///
    /// An explicitly given file must exist; the project's default one is
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn load(paths: ProjectPaths, python: Option<String>) -> Result<Self> {
        let config_found = paths.config_path.is_file();
        let config = if paths.uses_default_config() {
            Config::load_optional(&paths.config_path)?
        } else {
            Config::load(&paths.config_path)?
        };

        tracing::debug!(
            project = %paths.project_dir.display(),
            config = %paths.config_path.display(),
            config_found,
            "Loaded runtime context"
        );

        Ok(Self::new(config, paths, config_found, python))
    }

    /// Project root
    #[inline]
    pub fn project_dir(&self) -> &Path {
        &self.paths.project_dir
    }

    /// Configuration file path
    #[inline]
    pub fn config_path(&self) -> &Path {
        &self.paths.config_path
    }

    /// Check if a configuration file was loaded
    #[inline]
    pub fn config_found(&self) -> bool {
        self.config_found
    }

    /// Configuration, failing when the project has no `kiln.toml`
    ///
    /// # Errors
    ///
    /// Returns the config error with a starter example if the file is missing.
    pub fn require_config(&self) -> Result<&Config> {
        if !self.config_found {
            Config::load_from_project(self.project_dir())?;
        }
        Ok(&self.config)
    }

    /// Interpreter command: `--python` first, then `[interpreter] command`
    pub fn interpreter_command(&self) -> Option<&str> {
        self.python
            .as_deref()
            .or(self.config.interpreter.command.as_deref())
    }

    /// Detect the interpreter to run hooks with
    ///
    /// # Errors
    ///
    /// Returns an error if no interpreter can be found.
    pub fn runtime(&self) -> Result<PythonRuntime> {
        Ok(PythonRuntime::detect(self.interpreter_command())?)
    }

    /// Per-script time limit from the configuration
    pub fn script_timeout(&self) -> Option<Duration> {
        match self.config.scripts.timeout {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        }
    }
}
