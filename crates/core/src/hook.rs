//! Compile hook vocabulary
//!
//! The types every layer agrees on when asking an extension to run a hook:
//! which hook, with which arguments, and what came of it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Point in the build lifecycle at which an extension is called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileHook {
    /// Before compilation
    PreCompile,
    /// After compilation
    PostCompile,
}

impl CompileHook {
    /// All hooks in lifecycle order
    pub const ALL: [CompileHook; 2] = [CompileHook::PreCompile, CompileHook::PostCompile];

    /// Name of the attribute looked up on the extension module
    pub fn attr_name(&self) -> &'static str {
        match self {
            CompileHook::PreCompile => "pre_compile",
            CompileHook::PostCompile => "post_compile",
        }
    }

    /// Short stage name used on the command line
    pub fn stage(&self) -> &'static str {
        match self {
            CompileHook::PreCompile => "pre",
            CompileHook::PostCompile => "post",
        }
    }
}

impl fmt::Display for CompileHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attr_name())
    }
}

impl FromStr for CompileHook {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pre" | "pre_compile" | "pre-compile" => Ok(CompileHook::PreCompile),
            "post" | "post_compile" | "post-compile" => Ok(CompileHook::PostCompile),
            other => Err(Error::Message(format!(
                "Unknown hook '{other}' (expected 'pre' or 'post')"
            ))),
        }
    }
}

/// The three positional strings forwarded to a hook
///
/// The invoker gives them no meaning; they are passed through verbatim and in
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookArgs([String; 3]);

impl HookArgs {
    /// Create hook arguments from three values
    pub fn new(first: impl Into<String>, second: impl Into<String>, third: impl Into<String>) -> Self {
        Self([first.into(), second.into(), third.into()])
    }

    /// Borrow the arguments in order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// How a hook call ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookOutcome {
    /// The module defined the hook and it returned normally
    Invoked,
    /// The module has no callable attribute with the hook's name
    Absent,
}

/// Where the extension's own output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Share the caller's stdout and stderr
    #[default]
    Inherit,
    /// Collect output and forward it to the log
    Capture,
}
