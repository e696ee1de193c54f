//! Items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One priced line on a bill, possibly split between several diners.
///
/// Every field is optional so that partially filled rows (and shared links
/// produced by older clients) still take part in a calculation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Display label, no effect on the arithmetic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// Full printed price of the line, before tax and tip
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    cost: Option<Decimal>,

    /// How many shares of the item the current diner is covering
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    portions_paying: Option<Decimal>,

    /// How many equal shares the item was divided into.
    ///
    /// Zero and negative values come from the custom split input and only
    /// their magnitude matters.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    total_portions: Option<Decimal>,

    /// Opaque identifier for list management
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl Item {
    /// Creates an unsplit item with the given cost.
    pub fn new(cost: Decimal) -> Self {
        Self {
            cost: Some(cost),
            ..Self::default()
        }
    }

    /// Creates an empty row: paying one of one portions, with a fresh id.
    pub fn blank() -> Self {
        Self {
            portions_paying: Some(Decimal::ONE),
            total_portions: Some(Decimal::ONE),
            id: Some(new_id()),
            ..Self::default()
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the printed cost.
    #[must_use]
    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Sets how many of `total` shares the current diner pays for.
    #[must_use]
    pub fn with_portions(mut self, paying: impl Into<Decimal>, total: impl Into<Decimal>) -> Self {
        self.portions_paying = Some(paying.into());
        self.total_portions = Some(total.into());
        self
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the display name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the printed cost, if set
    pub fn cost(&self) -> Option<Decimal> {
        self.cost
    }

    /// Returns the number of shares paid for, if set
    pub fn portions_paying(&self) -> Option<Decimal> {
        self.portions_paying
    }

    /// Returns the number of shares the item was split into, if set
    pub fn total_portions(&self) -> Option<Decimal> {
        self.total_portions
    }

    /// Returns the identifier, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Replaces the printed cost.
    pub fn set_cost(&mut self, cost: Option<Decimal>) {
        self.cost = cost;
    }

    /// Replaces the number of shares paid for.
    pub fn set_portions_paying(&mut self, portions: Option<Decimal>) {
        self.portions_paying = portions;
    }

    /// Replaces the number of shares the item is split into.
    pub fn set_total_portions(&mut self, portions: Option<Decimal>) {
        self.total_portions = portions;
    }

    /// Assigns a fresh identifier when the item has none.
    pub fn ensure_id(&mut self) {
        if self.id.is_none() {
            self.id = Some(new_id());
        }
    }

    /// Divisor used for the split: `max(1, |total_portions|)`, defaulting to 1.
    pub fn effective_portions(&self) -> Decimal {
        self.total_portions
            .unwrap_or(Decimal::ONE)
            .abs()
            .max(Decimal::ONE)
    }

    /// Fraction of the item the current diner is paying for.
    ///
    /// Not clamped: paying for more shares than exist yields a value above one.
    pub fn my_proportion(&self) -> Decimal {
        // divisor is at least one, so the quotient never exceeds the dividend
        self.portions_paying.unwrap_or(Decimal::ONE) / self.effective_portions()
    }

    /// The current diner's share of the item's cost.
    ///
    /// Returns `None` only if the product overflows the decimal range.
    pub fn my_share(&self) -> Option<Decimal> {
        self.cost
            .unwrap_or(Decimal::ZERO)
            .checked_mul(self.my_proportion())
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
