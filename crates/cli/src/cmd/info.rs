//! Info command implementation
//!
//! Display kiln version, build metadata, platform and interpreter status.

use clap::Args;
use kiln_core::platform::CURRENT_PLATFORM;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::debug;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

const NOT_FOUND: &str = "not found";

/// Information about the kiln installation
#[derive(Debug, Serialize)]
pub struct InfoData {
    kiln: KilnInfo,
    build: BuildInfo,
    system: SystemInfo,
    interpreter: InterpreterInfo,
}

#[derive(Debug, Serialize)]
struct KilnInfo {
    version: &'static str,
    project: String,
    config: String,
    config_exists: bool,
    scripts: usize,
}

#[derive(Debug, Serialize)]
struct BuildInfo {
    rustc: &'static str,
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
struct SystemInfo {
    os: String,
    platform: &'static str,
    architecture: &'static str,
}

#[derive(Debug, Serialize)]
struct InterpreterInfo {
    command: Option<String>,
    program: Option<String>,
    version: Option<String>,
    error: Option<String>,
}

/// Info command
#[derive(Debug, Args)]
pub struct InfoCommand {
    /// Output in JSON format (default: table format)
    #[arg(long)]
    pub json: bool,
}

impl Command for InfoCommand {
    type Output = InfoData;

    fn execute(&self, context: &RuntimeContext) -> Result<InfoData> {
        let info = gather_info(context);

        if self.json {
            let json = serde_json::to_string_pretty(&info)
                .map_err(|e| anyhow::anyhow!("Failed to serialize info: {e}"))?;
            println!("{json}");
        } else {
            display_table(&info);
        }

        Ok(info)
    }
}

fn gather_info(context: &RuntimeContext) -> InfoData {
    debug!("Gathering system information");

    let scripts = &context.config.scripts;

    InfoData {
        kiln: KilnInfo {
            version: env!("CARGO_PKG_VERSION"),
            project: context.project_dir().display().to_string(),
            config: context.config_path().display().to_string(),
            config_exists: context.config_found(),
            scripts: scripts.pre_compile.len() + scripts.post_compile.len(),
        },
        build: BuildInfo {
            rustc: option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
            timestamp: option_env!("VERGEN_BUILD_TIMESTAMP").and_then(|s| {
                chrono::DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            }),
        },
        system: SystemInfo {
            os: get_os_name(),
            platform: CURRENT_PLATFORM.os,
            architecture: CURRENT_PLATFORM.arch,
        },
        interpreter: get_interpreter_info(context),
    }
}

/// Detect the interpreter without failing the command
fn get_interpreter_info(context: &RuntimeContext) -> InterpreterInfo {
    let command = context.interpreter_command().map(str::to_string);

    match context.runtime() {
        Ok(runtime) => InterpreterInfo {
            command,
            program: Some(runtime.program().display().to_string()),
            version: runtime.version(),
            error: None,
        },
        Err(e) => InterpreterInfo {
            command,
            program: None,
            version: None,
            error: Some(e.to_string()),
        },
    }
}

/// Get OS name with version if possible using `os_info` crate
fn get_os_name() -> String {
    let info = os_info::get();

    let version = info.version();
    if version == &os_info::Version::Unknown {
        info.os_type().to_string()
    } else {
        format!("{} {}", info.os_type(), version)
    }
}

fn print_section_header(name: &str) {
    println!("{}", name.bright_white().bold());
}

fn print_row(label: &str, value: &str, ok: bool, note: Option<&str>) {
    let symbol = if ok {
        "✓".bright_green().to_string()
    } else {
        "✗".bright_red().to_string()
    };

    let formatted_value = if ok {
        value.bright_white().to_string()
    } else {
        value.dimmed().to_string()
    };

    match note {
        Some(note_text) => println!(
            "  {symbol} {label:14} {formatted_value} {}",
            format!("({note_text})").dimmed()
        ),
        None => println!("  {symbol} {label:14} {formatted_value}"),
    }
}

fn display_table(info: &InfoData) {
    print_section_header("Kiln");
    print_row("Version", info.kiln.version, true, None);
    print_row("Project", &info.kiln.project, true, None);
    print_row(
        "Config",
        &info.kiln.config,
        info.kiln.config_exists,
        (!info.kiln.config_exists).then_some(NOT_FOUND),
    );
    print_row("Scripts", &info.kiln.scripts.to_string(), true, None);
    println!();

    print_section_header("Build");
    print_row("Rustc", info.build.rustc, true, None);
    if let Some(time) = info.build.timestamp.as_ref() {
        print_row("Timestamp", time, true, None);
    }
    println!();

    print_section_header("System");
    print_row("OS", &info.system.os, true, None);
    print_row("Platform", info.system.platform, true, None);
    print_row("Architecture", info.system.architecture, true, None);
    println!();

    let interpreter = &info.interpreter;
    print_section_header("Python");
    if let Some(command) = interpreter.command.as_ref() {
        print_row("Command", command, true, None);
    }
    match (interpreter.program.as_ref(), interpreter.error.as_ref()) {
        (Some(program), _) => {
            print_row("Program", program, true, None);
            print_row(
                "Version",
                interpreter.version.as_deref().unwrap_or("unknown"),
                interpreter.version.is_some(),
                None,
            );
        }
        (None, error) => print_row("Program", NOT_FOUND, false, error.map(String::as_str)),
    }
}
