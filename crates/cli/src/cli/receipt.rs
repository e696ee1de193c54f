use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use clap::{Args, Subcommand};
use dinner_debt::prelude::*;
use tracing::debug;

use super::output_error;
use crate::bill_file::{self, BillFormat};

#[derive(Debug, Args)]
pub(crate) struct ReceiptCommand {
    #[command(subcommand)]
    command: ReceiptSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReceiptSubcommand {
    /// Turn a saved receipt reader reply into a bill
    Import(ImportArgs),

    /// Check that a photo can be sent to the receipt reader
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// File holding the reader's raw reply
    reply: PathBuf,

    /// Existing bill to fill in instead of a fresh one
    #[arg(long)]
    into: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = BillFormat::Yaml)]
    format: BillFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Receipt photo
    image: PathBuf,
}

pub(crate) fn run(command: ReceiptCommand, out: &mut impl Write) -> Result<(), String> {
    match command.command {
        ReceiptSubcommand::Import(args) => import(&args, out),
        ReceiptSubcommand::Check(args) => check(&args, out),
    }
}

fn import(args: &ImportArgs, out: &mut impl Write) -> Result<(), String> {
    let reply = fs::read_to_string(&args.reply)
        .map_err(|error| format!("failed to read {}: {error}", args.reply.display()))?;

    let receipt = ReceiptData::from_response(&reply).map_err(|error| error.to_string())?;

    let mut state = match &args.into {
        Some(path) => {
            bill_file::load(path).map_err(|error| format!("failed to load bill: {error}"))?
        }
        None => SharedState::new(Bill::fresh(), None),
    };

    receipt.apply_to(&mut state.bill);

    debug!(items = receipt.items.len(), "imported receipt");

    let rendered = args
        .format
        .render(&state)
        .map_err(|error| format!("failed to render bill: {error}"))?;

    write!(out, "{}", rendered.trim_end()).map_err(output_error)?;
    writeln!(out).map_err(output_error)
}

fn check(args: &CheckArgs, out: &mut impl Write) -> Result<(), String> {
    let bytes = fs::read(&args.image)
        .map_err(|error| format!("failed to read {}: {error}", args.image.display()))?;

    let file_name = args
        .image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let image = ReceiptImage::new(file_name, mime_type(&args.image), bytes);

    image.validate().map_err(|error| error.to_string())?;

    writeln!(
        out,
        "{} ({}, {} bytes) can be read",
        image.file_name(),
        image.mime_type(),
        image.bytes().len()
    )
    .map_err(output_error)
}

fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => "application/octet-stream",
    }
}
