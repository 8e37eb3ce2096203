//! Trestle CLI entry point.

use std::process;

use clap::Parser;
use log::{debug, info};

use trestle_cli::{Args, error_adapter::to_reportables};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    // Usage errors exit with clap's status 2 before anything is read
    let args = Args::parse();

    // Logs go to stderr; stdout carries only SVG in stream mode
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    info!(mode:? = args.mode(); "Starting Trestle");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = trestle_cli::run(&args) {
        let reporter = miette::GraphicalReportHandler::new();

        // Render each diagnostic independently
        for reportable in to_reportables(&err) {
            let mut writer = String::new();
            if reporter.render_report(&mut writer, &reportable).is_err() {
                writer = reportable.to_string();
            }
            eprintln!("{writer}");
        }

        process::exit(1);
    }

    info!("Completed successfully");
}
