#![cfg_attr(all(not(use_console), target_os = "windows"), windows_subsystem = "windows")]
#![cfg_attr(all(use_console, target_os = "windows"), windows_subsystem = "console")]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use std::env;
use std::process::ExitCode;

use tracing::{error, info};

use driftbelt::app::App;
use driftbelt::constants::{LOOP_TIME, TICKRATE};
use driftbelt::platform;

/// The main entry point of the application.
///
/// This function initializes logging, builds the [`App`] (window, audio,
/// simulation thread), and hands control to its render loop until exit.
pub fn main() -> ExitCode {
    let force_console = {
        let args: Vec<String> = env::args().collect();
        args.iter().any(|arg| arg == "--console" || arg == "-c")
    };

    platform::init_console(force_console).expect("Could not initialize console");

    let mut app = match App::new() {
        Ok(app) => app,
        Err(err) => {
            error!("Could not start: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!(tickrate = TICKRATE, loop_time = ?LOOP_TIME, "Starting game loop");

    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Exited with an error: {err}");
            ExitCode::FAILURE
        }
    }
}
