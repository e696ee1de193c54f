use std::io::Write;

use clap::Args;
use dinner_debt::expression::{evaluate, evaluate_or};
use rust_decimal::Decimal;

use super::output_error;

#[derive(Debug, Args)]
pub(crate) struct EvalArgs {
    /// Expression using numbers, + - * / and parentheses
    expression: String,

    /// Print this value instead of failing when the expression is invalid
    #[arg(long)]
    default: Option<Decimal>,
}

pub(crate) fn run(args: &EvalArgs, out: &mut impl Write) -> Result<(), String> {
    let value = match args.default {
        Some(default) => evaluate_or(&args.expression, default),
        None => evaluate(&args.expression)
            .map_err(|error| format!("invalid expression {:?}: {error}", args.expression))?,
    };

    writeln!(out, "{}", value.normalize()).map_err(output_error)
}
