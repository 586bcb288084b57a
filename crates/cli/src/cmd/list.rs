//! List command implementation
//!
//! Shows the scripts `kiln.toml` configures for each stage.

use clap::Args;
use kiln_core::CompileHook;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// A configured script and where it resolves to
#[derive(Debug, Serialize)]
pub struct ScriptEntry {
    /// Name as written in `kiln.toml`
    pub name: String,
    /// Resolved file
    pub path: PathBuf,
    /// Whether the file exists
    pub exists: bool,
}

/// Scripts of one stage
#[derive(Debug, Serialize)]
pub struct StageEntry {
    /// Stage hook
    pub hook: CompileHook,
    /// Scripts in run order
    pub scripts: Vec<ScriptEntry>,
}

/// List configured compile scripts
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl Command for ListCommand {
    type Output = Vec<StageEntry>;

    fn execute(&self, context: &RuntimeContext) -> Result<Vec<StageEntry>> {
        let config = context.require_config()?;
        let stages = collect_stages(context);

        if self.json {
            let json = serde_json::to_string_pretty(&stages)
                .map_err(|e| anyhow::anyhow!("Failed to serialize script list: {e}"))?;
            println!("{json}");
        } else if config.scripts.is_empty() {
            println!("{}", "No compile scripts configured.".yellow());
            println!(
                "Add [scripts] pre_compile / post_compile lists to {}",
                context.config_path().display()
            );
        } else {
            display_stages(&stages);
        }

        Ok(stages)
    }
}

fn collect_stages(context: &RuntimeContext) -> Vec<StageEntry> {
    let scripts = &context.config.scripts;

    CompileHook::ALL
        .into_iter()
        .map(|hook| StageEntry {
            hook,
            scripts: scripts
                .for_hook(hook)
                .iter()
                .map(|name| {
                    let path = scripts.resolve(context.project_dir(), name);
                    ScriptEntry {
                        name: name.clone(),
                        exists: path.is_file(),
                        path,
                    }
                })
                .collect(),
        })
        .collect()
}

fn display_stages(stages: &[StageEntry]) {
    for stage in stages {
        println!(
            "{} {}",
            stage.hook.attr_name().bright_white().bold(),
            format!("({})", stage.scripts.len()).dimmed()
        );

        if stage.scripts.is_empty() {
            println!("  {}", "none".dimmed());
        }

        for script in &stage.scripts {
            let symbol = if script.exists {
                "✓".bright_green().to_string()
            } else {
                "✗".bright_red().to_string()
            };
            println!(
                "  {symbol} {:20} {}",
                script.name,
                script.path.display().dimmed()
            );
        }
        println!();
    }
}
