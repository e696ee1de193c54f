use std::io::{self, Write};

use clap::{Parser, Subcommand};

use crate::config::{LoggingConfig, SettingsConfig};

mod calculate;
mod eval;
mod receipt;
mod settings;
mod share;

#[derive(Debug, Parser)]
#[command(
    name = "dinner-debt",
    about = "Work out your share of a restaurant bill",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(flatten)]
    settings: SettingsConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print what you owe for a bill file, with a payment link
    Calculate(calculate::CalculateArgs),

    /// Turn a bill into a share link, or a share link back into a bill
    Share(share::ShareCommand),

    /// Evaluate an arithmetic expression such as `(18.99 + 4.50) / 3`
    Eval(eval::EvalArgs),

    /// Work with receipt reader replies
    Receipt(receipt::ReceiptCommand),

    /// Show or change saved settings
    Settings(settings::SettingsCommand),
}

impl Cli {
    /// Parses arguments, after loading `.env` if present.
    pub(crate) fn load() -> Self {
        _ = dotenvy::dotenv();

        Self::parse()
    }

    pub(crate) fn run(self, out: &mut impl Write) -> Result<(), String> {
        match self.command {
            Commands::Calculate(args) => calculate::run(args, &self.settings, out),
            Commands::Share(command) => share::run(command, &self.settings, out),
            Commands::Eval(args) => eval::run(&args, out),
            Commands::Receipt(command) => receipt::run(command, out),
            Commands::Settings(command) => settings::run(command, &self.settings, out),
        }
    }
}

fn output_error(error: io::Error) -> String {
    format!("failed to write output: {error}")
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn settings_path_is_a_global_flag() -> TestResult {
        let cli = Cli::try_parse_from([
            "dinner-debt",
            "eval",
            "1 + 1",
            "--settings",
            "/tmp/dinner.json",
        ])?;

        assert_eq!(cli.settings.path.to_str(), Some("/tmp/dinner.json"));

        Ok(())
    }

    #[test]
    fn dispatches_to_subcommands() -> TestResult {
        let cli = Cli::try_parse_from(["dinner-debt", "eval", "2 * 3.5"])?;
        let mut out = Vec::new();

        cli.run(&mut out)?;

        assert_eq!(String::from_utf8(out)?, "7\n");

        Ok(())
    }
}
