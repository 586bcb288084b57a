//! Kiln CLI library
//!
//! This library contains all the CLI logic for kiln, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;

use clap::{Parser, Subcommand};
use kiln_core::CompileHook;
use std::path::PathBuf;

use command::Command;
use common::{ProjectPaths, RuntimeContext};
use error::Result;

/// Kiln - compile hooks for level projects
#[derive(Debug, Parser)]
#[command(name = "kiln")]
#[command(about = "Run pre- and post-compile hooks of level project scripts")]
#[command(version)]
#[command(long_about = "Run pre- and post-compile hooks of level project scripts

A script is a Python module that may define pre_compile(a, b, c) and
post_compile(a, b, c). The build pipeline calls `kiln pre-compile` and
`kiln post-compile` with the script path and three arguments; a script
without the hook is skipped.

Exit status:
  • 0 when the hook ran or the script does not define it
  • 1 when the script cannot be found (message on stdout) or kiln fails
  • the interpreter's status when the hook raises")]
pub struct Cli {
    /// Path to the project directory
    #[arg(long, env = "KILN_PROJECT_DIR", value_name = "DIR", global = true)]
    pub project: Option<PathBuf>,

    /// Path to the config file (default: <project>/kiln.toml)
    #[arg(long, env = "KILN_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Interpreter command (e.g. "python3.12" or "py -3")
    #[arg(long, env = "KILN_PYTHON", value_name = "CMD", global = true)]
    pub python: Option<String>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "KILN_LOG_FILE", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for kiln CLI
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pre_compile hook of a script
    #[command(name = "pre-compile")]
    PreCompile(cmd::invoke::InvokeArgs),

    /// Run the post_compile hook of a script
    #[command(name = "post-compile")]
    PostCompile(cmd::invoke::InvokeArgs),

    /// Run the scripts configured in kiln.toml for a stage
    #[command(long_about = "Run the scripts configured in kiln.toml for a stage

Each script's hook is called with the target directory, the project
directory and the level name.

Examples:
  • kiln run pre --target build/castle --name castle
  • kiln --project ~/levels run post --target out --name intro")]
    Run(cmd::run::RunCommand),

    /// List the configured compile scripts
    List(cmd::list::ListCommand),

    /// Display kiln, platform and interpreter information
    Info(cmd::info::InfoCommand),
}

/// Main entry point for the CLI application
///
/// # Errors
///
/// Returns an error if:
/// - Logging initialization fails
/// - The project directory or configuration cannot be loaded
/// - Command execution fails
pub fn run(cli: Cli) -> Result<()> {
    kiln_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let paths = ProjectPaths::resolve(cli.project.as_deref(), cli.config.as_deref())?;
    let context = RuntimeContext::load(paths, cli.python)?;

    execute_command(&cli.command, &context)
}

/// Execute the command based on the command type
fn execute_command(command: &Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::PreCompile(args) => {
            cmd::invoke::InvokeCommand::new(CompileHook::PreCompile, args).execute(context)?;
        }
        Commands::PostCompile(args) => {
            cmd::invoke::InvokeCommand::new(CompileHook::PostCompile, args).execute(context)?;
        }
        Commands::Run(run_cmd) => {
            run_cmd.execute(context)?;
        }
        Commands::List(list_cmd) => {
            list_cmd.execute(context)?;
        }
        Commands::Info(info_cmd) => {
            info_cmd.execute(context)?;
        }
    }

    Ok(())
}
