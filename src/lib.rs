pub mod backends;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod core;
pub mod editor;
pub mod error;
pub mod state;
pub mod ui;
pub mod utils;

use clap::Parser;
use std::process::exit;

/// Run the vimpack CLI entrypoint.
pub fn run_cli() {
    ui::init_colors();

    // Ctrl-C stops new task admission; in-flight tasks run to completion.
    ctrlc::set_handler(move || {
        eprintln!();
        ui::mark_interrupted();
        ui::warning("Interrupted; finishing in-flight tasks.");
    })
    .expect("Error setting Ctrl-C handler");

    let args = cli::args::Cli::parse();
    ui::set_quiet(args.global.quiet);
    ui::set_verbose(args.global.verbose);

    if let Err(e) = cli::dispatcher::dispatch(&args) {
        ui::error(&format!("{}", e));
        exit(1);
    }
}
