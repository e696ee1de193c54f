use std::{io::Write, path::PathBuf, str::FromStr};

use clap::{Args, ValueEnum};
use dinner_debt::{payment::DEFAULT_NOTE, prelude::*};
use rust_decimal::Decimal;
use rusty_money::iso;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Style, object::Columns},
};
use tracing::debug;

use super::output_error;
use crate::{bill_file, config::SettingsConfig};

#[derive(Debug, Args)]
pub(crate) struct CalculateArgs {
    /// Bill file (.yml, .yaml or .json)
    bill: PathBuf,

    /// Where the payment link will be opened
    #[arg(long, value_enum, default_value_t = Device::Desktop)]
    device: Device,

    /// Note attached to the payment
    #[arg(long, default_value = DEFAULT_NOTE)]
    note: String,

    /// Claim only this item of a shared bill, by id, optionally with your own
    /// split as `ID=PAYING/TOTAL`; repeat for each item you had
    #[arg(long = "item", value_name = "ID[=PAYING/TOTAL]", value_parser = parse_pick)]
    items: Vec<ItemPick>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Device {
    /// Phone or tablet with the Venmo app
    Mobile,

    /// Web browser
    Desktop,
}

impl From<Device> for Platform {
    fn from(device: Device) -> Self {
        match device {
            Device::Mobile => Platform::Mobile,
            Device::Desktop => Platform::Desktop,
        }
    }
}

#[derive(Debug, Tabled)]
struct BreakdownRow {
    #[tabled(rename = "")]
    label: &'static str,

    #[tabled(rename = "You owe")]
    amount: String,
}

pub(crate) fn run(
    args: CalculateArgs,
    settings: &SettingsConfig,
    out: &mut impl Write,
) -> Result<(), String> {
    let SharedState {
        bill,
        venmo_username,
    } = bill_file::load(&args.bill).map_err(|error| format!("failed to load bill: {error}"))?;

    let bill = claimed(bill, &args.items)?;
    let breakdown = DebtBreakdown::from_bill(&bill);

    writeln!(out, "{}", describe_tip(bill.tip_mode())).map_err(output_error)?;
    writeln!(out, "{}", breakdown_table(&breakdown)).map_err(output_error)?;

    let recipient = match venmo_username {
        Some(recipient) => Some(recipient),
        None => {
            Settings::load(&settings.store())
                .map_err(|error| format!("failed to load settings: {error}"))?
                .venmo_username
        }
    };

    debug!(has_recipient = recipient.is_some(), "building payment link");

    let mut request = PaymentRequest::new(breakdown.total()).with_note(args.note);

    if let Some(recipient) = recipient {
        request = request.with_recipient(recipient);
    }

    writeln!(out, "Pay: {}", request.venmo_url(args.device.into())).map_err(output_error)
}

/// The whole bill when nothing is claimed, otherwise only the claimed items.
fn claimed(bill: Bill, picks: &[ItemPick]) -> Result<Bill, String> {
    if picks.is_empty() {
        return Ok(bill);
    }

    let unknown = bill.unknown_picks(picks);

    if !unknown.is_empty() {
        return Err(format!("no item with id {} on this bill", unknown.join(", ")));
    }

    debug!(claimed = picks.len(), of = bill.items().len(), "narrowing bill to claimed items");

    Ok(bill.selected(picks))
}

/// Parses `ID` or `ID=PAYING/TOTAL`.
fn parse_pick(value: &str) -> Result<ItemPick, String> {
    let (id, split) = match value.split_once('=') {
        Some((id, split)) => (id.trim(), Some(split)),
        None => (value.trim(), None),
    };

    if id.is_empty() {
        return Err("item id cannot be empty".to_string());
    }

    let pick = ItemPick::new(id);

    let Some(split) = split else {
        return Ok(pick);
    };

    let (paying, total) = split
        .split_once('/')
        .ok_or_else(|| format!("expected PAYING/TOTAL after '=', got {split:?}"))?;

    Ok(pick.with_split(portions(paying)?, portions(total)?))
}

fn portions(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|error| format!("invalid portions {value:?}: {error}"))
}

fn describe_tip(mode: TipMode) -> String {
    match mode {
        TipMode::Rate(rate) => format!("Tip: {}% of the total", rate.normalize()),
        TipMode::Flat(amount) => format!("Tip: {} flat", format_amount(amount, iso::USD)),
        TipMode::IncludedInTotal => "Tip: included in the total".to_string(),
    }
}

fn breakdown_table(breakdown: &DebtBreakdown) -> Table {
    let rows = [
        ("Items", breakdown.my_subtotal()),
        ("Tax", breakdown.my_tax()),
        ("Tip", breakdown.my_tip()),
        ("Total", breakdown.total()),
    ]
    .map(|(label, amount)| BreakdownRow {
        label,
        amount: format_amount(amount, iso::USD),
    });

    let mut table = Table::new(rows);
    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..), Alignment::right());

    table
}
