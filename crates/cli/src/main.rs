//! Command-line interface for the `extsync` application.
//!
//! Exit status: `0` when everything synced cleanly, `1` on any error and
//! `3` when conflicts were left in place.

mod app;
mod cli;
mod commands;

use std::process::ExitCode;

fn main() -> ExitCode {
    match app::run() {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
