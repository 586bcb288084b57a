//! Kiln CLI application entry point
//!
//! This is the minimal main entry point that delegates to the library.

use clap::Parser;

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(false)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))
    .ok();

    let cli = kiln::Cli::parse();

    if let Err(e) = kiln::run(cli) {
        // The build pipeline reads this line from stdout
        if e.is_module_not_found() {
            println!("{e}");
        } else {
            let miette_error = miette::Report::msg(format!("{e:#}"));
            eprintln!("{miette_error:?}");
        }
        std::process::exit(e.exit_code());
    }
}
