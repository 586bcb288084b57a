//! Run command implementation
//!
//! Runs every script configured in `kiln.toml` for one stage with the build
//! context as hook arguments.

use clap::Args;
use kiln_core::CompileHook;
use kiln_engine::{BuildContext, CompileScripts, StepReport};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};

/// Run the compile scripts of a stage
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Stage to run (`pre` or `post`)
    #[arg(value_name = "STAGE")]
    pub stage: CompileHook,

    /// Directory the compile writes into
    #[arg(long, value_name = "DIR")]
    pub target: PathBuf,

    /// Name of the level being compiled
    #[arg(long, value_name = "LEVEL")]
    pub name: String,
}

impl Command for RunCommand {
    type Output = StepReport;

    fn execute(&self, context: &RuntimeContext) -> Result<StepReport> {
        let config = context.require_config()?;
        let stage = self.stage.attr_name();

        if config.scripts.for_hook(self.stage).is_empty() {
            println!("{}", format!("No {stage} scripts configured.").dimmed());
            return Ok(StepReport::empty(self.stage));
        }

        let target = std::path::absolute(&self.target).map_err(|source| {
            CommandError::InvalidPath {
                path: self.target.clone(),
                source,
            }
        })?;

        let runtime = context.runtime()?.with_timeout(context.script_timeout());
        let runner = CompileScripts::new(&config.scripts, context.project_dir(), runtime);

        let report = runner.run(
            self.stage,
            &BuildContext {
                target: &target,
                name: &self.name,
            },
        )?;

        print_report(&report);

        if report.is_success() {
            Ok(report)
        } else {
            Err(CommandError::StageFailed {
                stage,
                failed: report.failed.len(),
                total: report.total(),
            })
        }
    }
}

fn print_report(report: &StepReport) {
    println!("{}", report.hook.attr_name().bright_white().bold());

    for name in &report.invoked {
        println!("  {} {name}", "✓".bright_green());
    }
    for name in &report.absent {
        println!(
            "  {} {name} {}",
            "-".dimmed(),
            format!("(no {})", report.hook.attr_name()).dimmed()
        );
    }
    for (name, err) in &report.failed {
        println!("  {} {name} {}", "✗".bright_red(), format!("({err})").dimmed());
    }

    println!(
        "\n{} ran, {} without hook, {} failed",
        report.invoked.len(),
        report.absent.len(),
        report.failed.len()
    );
}
