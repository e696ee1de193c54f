//! Money
//!
//! Presentation helpers for turning a raw debt into currency amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};

/// Rounds an amount to the currency's minor unit, half away from zero.
pub fn round_to_currency(amount: Decimal, currency: &Currency) -> Money<'_, Currency> {
    let rounded =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);

    Money::from_decimal(rounded, currency)
}

/// Formats an amount for display, e.g. `$1,234.56`.
pub fn format_amount(amount: Decimal, currency: &Currency) -> String {
    round_to_currency(amount, currency).to_string()
}

/// Formats an amount for a payment request: rounded, no symbol and no
/// grouping separators, e.g. `1234.56`.
pub fn payment_amount(amount: Decimal, currency: &Currency) -> String {
    let money = round_to_currency(amount, currency);
    let places = usize::try_from(currency.exponent).unwrap_or(2);

    format!("{:.places$}", money.amount())
}
