use std::io::Write;

use clap::{Args, Subcommand};
use dinner_debt::settings::{JsonFileStore, Settings};
use tracing::info;

use super::output_error;
use crate::config::SettingsConfig;

/// Trailing characters of a secret shown by `settings show`.
const VISIBLE_SECRET_CHARS: usize = 4;

#[derive(Debug, Args)]
pub(crate) struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Debug, Subcommand)]
enum SettingsSubcommand {
    /// Print the saved settings
    Show,

    /// Save the Venmo handle payments are requested to
    SetVenmo(SetVenmoArgs),

    /// Turn beta features (receipt scanning) on or off
    SetBeta(SetBetaArgs),

    /// Save the receipt reader API key
    SetApiKey(SetApiKeyArgs),
}

#[derive(Debug, Args)]
struct SetVenmoArgs {
    /// Handle, with or without a leading `@`; omit to clear
    handle: Option<String>,
}

#[derive(Debug, Args)]
struct SetBetaArgs {
    /// Whether beta features are enabled
    #[arg(action = clap::ArgAction::Set)]
    enabled: bool,
}

#[derive(Debug, Args)]
struct SetApiKeyArgs {
    /// API key; omit to clear
    key: Option<String>,
}

pub(crate) fn run(
    command: SettingsCommand,
    config: &SettingsConfig,
    out: &mut impl Write,
) -> Result<(), String> {
    let mut store = config.store();
    let mut settings = load(&store)?;

    match command.command {
        SettingsSubcommand::Show => return show(&settings, out),
        SettingsSubcommand::SetVenmo(args) => {
            settings.venmo_username = args
                .handle
                .map(|handle| handle.trim().trim_start_matches('@').to_string())
                .filter(|handle| !handle.is_empty());
        }
        SettingsSubcommand::SetBeta(args) => settings.beta_features_enabled = args.enabled,
        SettingsSubcommand::SetApiKey(args) => {
            settings.api_key = args
                .key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty());
        }
    }

    settings
        .save(&mut store)
        .map_err(|error| format!("failed to save settings: {error}"))?;

    info!(path = %config.path.display(), "saved settings");

    show(&settings, out)
}

fn load(store: &JsonFileStore) -> Result<Settings, String> {
    Settings::load(store).map_err(|error| format!("failed to load settings: {error}"))
}

fn show(settings: &Settings, out: &mut impl Write) -> Result<(), String> {
    let venmo = settings.venmo_username.as_deref().unwrap_or("(not set)");
    let api_key = settings.api_key.as_deref().map_or_else(|| "(not set)".to_string(), mask);

    writeln!(out, "venmo username: {venmo}").map_err(output_error)?;
    writeln!(out, "beta features:  {}", settings.beta_features_enabled).map_err(output_error)?;
    writeln!(out, "api key:        {api_key}").map_err(output_error)
}

/// Keeps only the last four characters of a secret, and none of a short one.
fn mask(secret: &str) -> String {
    let length = secret.chars().count();

    if length <= VISIBLE_SECRET_CHARS {
        return "****".to_string();
    }

    let visible: String = secret
        .chars()
        .rev()
        .take(VISIBLE_SECRET_CHARS)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    format!("****{visible}")
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(subcommand)]
        command: SettingsSubcommand,
    }

    fn settings_command(args: &[&str]) -> Result<SettingsCommand, clap::Error> {
        let harness =
            Harness::try_parse_from(std::iter::once("settings").chain(args.iter().copied()))?;

        Ok(SettingsCommand {
            command: harness.command,
        })
    }

    fn invoke(config: &SettingsConfig, args: &[&str]) -> Result<String, String> {
        let command = settings_command(args).map_err(|error| error.to_string())?;
        let mut out = Vec::new();

        run(command, config, &mut out)?;

        String::from_utf8(out).map_err(|error| error.to_string())
    }

    #[test]
    fn show_defaults_for_missing_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = SettingsConfig {
            path: dir.path().join("settings.json"),
        };

        let output = invoke(&config, &["show"])?;

        assert_eq!(
            output,
            "venmo username: (not set)\nbeta features:  false\napi key:        (not set)\n"
        );

        Ok(())
    }

    #[test]
    fn changes_persist_between_runs() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = SettingsConfig {
            path: dir.path().join("settings.json"),
        };

        invoke(&config, &["set-venmo", "@sam-pays"])?;
        invoke(&config, &["set-beta", "true"])?;
        invoke(&config, &["set-api-key", "sk-or-123456789"])?;

        let settings = Settings::load(&config.store())?;

        assert_eq!(settings.venmo_username.as_deref(), Some("sam-pays"));
        assert!(settings.beta_features_enabled, "beta features should be on");
        assert_eq!(settings.api_key.as_deref(), Some("sk-or-123456789"));

        let output = invoke(&config, &["show"])?;

        assert!(output.contains("api key:        ****6789"), "{output}");
        assert!(!output.contains("sk-or"), "key should be masked: {output}");

        Ok(())
    }

    #[test]
    fn omitted_handle_clears_it() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = SettingsConfig {
            path: dir.path().join("settings.json"),
        };

        invoke(&config, &["set-venmo", "sam-pays"])?;
        invoke(&config, &["set-venmo"])?;

        assert_eq!(Settings::load(&config.store())?.venmo_username, None);

        Ok(())
    }

    #[test]
    fn mask_shows_only_the_tail_of_long_secrets() {
        assert_eq!(mask("abcdefgh"), "****efgh");
        assert_eq!(mask("abcd"), "****");
        assert_eq!(mask("ab"), "****");
    }
}
