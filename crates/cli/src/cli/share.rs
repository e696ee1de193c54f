use std::{io::Write, path::PathBuf};

use clap::{Args, Subcommand};
use dinner_debt::{prelude::*, share::QUERY_PARAMETER};

use super::output_error;
use crate::{
    bill_file::{self, BillFormat},
    config::SettingsConfig,
};

/// Page the share link points at when no base URL is given.
const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

#[derive(Debug, Args)]
pub(crate) struct ShareCommand {
    #[command(subcommand)]
    command: ShareSubcommand,
}

#[derive(Debug, Subcommand)]
enum ShareSubcommand {
    /// Print a share link for a bill file
    Encode(EncodeArgs),

    /// Print the bill carried by a share link
    Decode(DecodeArgs),
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Bill file (.yml, .yaml or .json)
    bill: PathBuf,

    /// Page the link should open
    #[arg(long, env = "DINNER_DEBT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Debug, Args)]
struct DecodeArgs {
    /// Share link, its query string, or the bare encoded value
    data: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = BillFormat::Yaml)]
    format: BillFormat,
}

pub(crate) fn run(
    command: ShareCommand,
    settings: &SettingsConfig,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        ShareSubcommand::Encode(args) => encode(args, settings, out),
        ShareSubcommand::Decode(args) => decode(&args, out),
    }
}

fn encode(args: EncodeArgs, settings: &SettingsConfig, out: &mut impl Write) -> Result<(), String> {
    let mut state = bill_file::load(&args.bill)
        .map_err(|error| format!("failed to load bill: {error}"))?;

    if state.venmo_username.is_none() {
        state.venmo_username = Settings::load(&settings.store())
            .map_err(|error| format!("failed to load settings: {error}"))?
            .venmo_username;
    }

    let url = state
        .share_url(&args.base_url)
        .map_err(|error| format!("failed to encode bill: {error}"))?;

    writeln!(out, "{url}").map_err(output_error)
}

fn decode(args: &DecodeArgs, out: &mut impl Write) -> Result<(), String> {
    let state = parse_shared(&args.data).ok_or("no shared bill found in input")?;

    let rendered = args
        .format
        .render(&state)
        .map_err(|error| format!("failed to render bill: {error}"))?;

    write!(out, "{}", rendered.trim_end()).map_err(output_error)?;
    writeln!(out).map_err(output_error)
}

/// Accepts a full link, a query string or the encoded value itself.
fn parse_shared(input: &str) -> Option<SharedState> {
    let input = input.trim();
    let marker = format!("{QUERY_PARAMETER}=");

    match input.split_once('?') {
        Some((_, query)) => SharedState::from_query(query),
        None if input.contains(&marker) => SharedState::from_query(input),
        None => SharedState::decode(input),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    const BILL: &str = "
items:
  - name: Pasta
    cost: 30
    portionsPaying: 2
    totalPortions: 3
subtotal: 30
total: 33
tip: 20
tipIsRate: true
";

    fn sample() -> SharedState {
        SharedState::new(
            Bill::new(vec![Item::new(Decimal::from(10)).with_id("a")])
                .with_subtotal(Decimal::from(10))
                .with_total(Decimal::from(11)),
            Some("sam-pays".to_string()),
        )
    }

    #[test]
    fn encode_prints_link_with_saved_handle() -> TestResult {
        let dir = tempfile::tempdir()?;
        let bill = dir.path().join("bill.yml");
        fs::write(&bill, BILL)?;

        let settings = SettingsConfig {
            path: dir.path().join("settings.json"),
        };
        Settings {
            venmo_username: Some("saved-handle".to_string()),
            ..Settings::default()
        }
        .save(&mut settings.store())?;

        let mut out = Vec::new();
        let args = EncodeArgs {
            bill,
            base_url: "https://example.com/".to_string(),
        };

        encode(args, &settings, &mut out)?;

        let url = String::from_utf8(out)?;
        let state = parse_shared(&url).ok_or("printed link should decode")?;

        assert!(url.starts_with("https://example.com/?data="), "{url}");
        assert_eq!(state.venmo_username.as_deref(), Some("saved-handle"));
        assert_eq!(calculate_debt(&state.bill).round_dp(2), Decimal::new(26_40, 2));

        Ok(())
    }

    #[test]
    fn accepts_every_input_shape() -> TestResult {
        let state = sample();
        let url = state.share_url("https://example.com/split")?;
        let (_, query) = url.split_once('?').ok_or("url should have a query")?;

        assert_eq!(parse_shared(&url), Some(state.clone()));
        assert_eq!(parse_shared(query), Some(state.clone()));
        assert_eq!(parse_shared(&format!("  {}\n", state.encode()?)), Some(state));
        assert_eq!(parse_shared("not a share link"), None);

        Ok(())
    }

    #[test]
    fn decode_prints_bill_as_json() -> TestResult {
        let state = sample();
        let args = DecodeArgs {
            data: state.encode()?,
            format: BillFormat::Json,
        };
        let mut out = Vec::new();

        decode(&args, &mut out)?;

        let printed = String::from_utf8(out)?;

        assert_eq!(BillFormat::Json.parse(&printed)?, state);

        Ok(())
    }

    #[test]
    fn decode_rejects_garbage() {
        let args = DecodeArgs {
            data: "%%%".to_string(),
            format: BillFormat::Yaml,
        };

        let result = decode(&args, &mut Vec::new());

        assert_eq!(result, Err("no shared bill found in input".to_string()));
    }
}
