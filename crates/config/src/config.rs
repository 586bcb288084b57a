//! Configuration management
//!
//! This module handles loading the project's `kiln.toml`.

use crate::Result;
use kiln_core::CompileHook;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the project configuration
pub const CONFIG_FILE_NAME: &str = "kiln.toml";

/// Interpreter selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterpreterConfig {
    /// Interpreter command, split with shell quoting rules (e.g. `"py -3"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Compile script lists and how to run them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Directory holding the scripts, relative to the project root
    #[serde(default = "default_scripts_dir")]
    pub dir: PathBuf,

    /// Scripts whose `pre_compile` hook runs before compilation
    #[serde(default)]
    pub pre_compile: Vec<String>,

    /// Scripts whose `post_compile` hook runs after compilation
    #[serde(default)]
    pub post_compile: Vec<String>,

    /// Per-script time limit in seconds (0 = no limit)
    #[serde(default)]
    pub timeout: u64,

    /// Keep running the remaining scripts of a stage after a failure
    #[serde(default)]
    pub continue_on_error: bool,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            dir: default_scripts_dir(),
            pre_compile: Vec::new(),
            post_compile: Vec::new(),
            timeout: 0,
            continue_on_error: false,
        }
    }
}

impl ScriptsConfig {
    /// Script names configured for a hook
    pub fn for_hook(&self, hook: CompileHook) -> &[String] {
        match hook {
            CompileHook::PreCompile => &self.pre_compile,
            CompileHook::PostCompile => &self.post_compile,
        }
    }

    /// Check if no scripts are configured at all
    pub fn is_empty(&self) -> bool {
        self.pre_compile.is_empty() && self.post_compile.is_empty()
    }

    /// Resolve a configured script name to a file path
    ///
    /// A `.py` suffix is appended when missing. Absolute names are kept as
    /// they are; relative names live in the scripts directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiln_config::ScriptsConfig;
    /// use std::path::Path;
    ///
    /// let scripts = ScriptsConfig::default();
    /// assert_eq!(
    ///     scripts.resolve(Path::new("/proj"), "gen_assets"),
    ///     Path::new("/proj/scripts/gen_assets.py")
    /// );
    /// ```
    pub fn resolve(&self, project_dir: &Path, name: &str) -> PathBuf {
        let file_name = if name.ends_with(".py") {
            name.to_string()
        } else {
            format!("{name}.py")
        };

        let path = Path::new(&file_name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_dir.join(&self.dir).join(path)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.dir.is_absolute() {
            return Err(kiln_core::Error::Config(format!(
                "scripts.dir must be relative to the project root, got {}",
                self.dir.display()
            )));
        }

        for hook in CompileHook::ALL {
            if self.for_hook(hook).iter().any(|name| name.trim().is_empty()) {
                return Err(kiln_core::Error::Config(format!(
                    "scripts.{} contains an empty script name",
                    hook.attr_name()
                )));
            }
        }

        Ok(())
    }
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("scripts")
}

/// Project configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Interpreter selection
    #[serde(default)]
    pub interpreter: InterpreterConfig,

    /// Compile scripts
    #[serde(default)]
    pub scripts: ScriptsConfig,
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            kiln_core::Error::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            kiln_core::Error::Config(msg) => {
                kiln_core::Error::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| kiln_core::Error::Config(e.to_string()))?;
        config.scripts.validate()?;
        Ok(config)
    }

    /// Load `kiln.toml` from a project directory
    ///
    /// # Errors
    ///
    /// Returns an error with a starter example if the file does not exist.
    pub fn load_from_project(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(kiln_core::Error::Config(format!(
                "{CONFIG_FILE_NAME} not found in {}.\n\
                 \n\
                 Create one with:\n\
                 cat > {CONFIG_FILE_NAME} << 'EOF'\n\
                 [scripts]\n\
                 pre_compile = [\"prepare\"]\n\
                 post_compile = [\"package\"]\n\
                 EOF",
                project_dir.display()
            )));
        }

        Self::load(config_path)
    }

    /// Load configuration if the file exists, defaults otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }
}
