//! Dinner Debt CLI

use std::{io, process::ExitCode};

use crate::cli::Cli;

mod bill_file;
mod cli;
mod config;
mod observability;

fn main() -> ExitCode {
    let cli = Cli::load();

    if let Err(error) = observability::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();

    match cli.run(&mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(clippy::print_stderr, reason = "command errors are reported to the user")]
            {
                eprintln!("{error}");
            }

            ExitCode::FAILURE
        }
    }
}
