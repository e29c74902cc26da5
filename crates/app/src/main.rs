//! Hearth Application CLI

use std::{
    io::{self, Write},
    process::ExitCode,
};

use hearth_app::observability;
use tracing::error;

mod cli;

fn main() -> ExitCode {
    let cli = match cli::Cli::load() {
        Ok(cli) => cli,
        Err(error) => error.exit(),
    };

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        _ = writeln!(io::stderr(), "{error}");

        return ExitCode::FAILURE;
    }

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");

            ExitCode::FAILURE
        }
    }
}
