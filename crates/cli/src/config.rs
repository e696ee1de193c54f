//! Command-line configuration shared by every subcommand

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use dinner_debt::settings::JsonFileStore;

/// Settings file used when none is given.
pub(crate) const DEFAULT_SETTINGS_PATH: &str = ".dinner-debt/settings.json";

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level or filter directives (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        global = true,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact
    )]
    pub(crate) log_format: LogFormat,
}

/// Where saved settings live.
#[derive(Debug, Args)]
pub(crate) struct SettingsConfig {
    /// Settings file (JSON)
    #[arg(
        long = "settings",
        global = true,
        env = "DINNER_DEBT_SETTINGS",
        default_value = DEFAULT_SETTINGS_PATH
    )]
    pub(crate) path: PathBuf,
}

impl SettingsConfig {
    pub(crate) fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.path)
    }
}
