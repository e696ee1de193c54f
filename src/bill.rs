//! Bill

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::items::Item;

/// Default tip offered for a new bill, in percentage points.
pub const DEFAULT_TIP_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// An item a diner claims from a shared bill, by id, optionally with a split
/// of their own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemPick {
    id: String,
    split: Option<(Decimal, Decimal)>,
}

impl ItemPick {
    /// Claims the item with `id` using the split already on the bill.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            split: None,
        }
    }

    /// Overrides the split: `paying` of `total` portions.
    #[must_use]
    pub fn with_split(mut self, paying: impl Into<Decimal>, total: impl Into<Decimal>) -> Self {
        self.split = Some((paying.into(), total.into()));
        self
    }

    /// Returns the claimed item id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the overriding split, if any
    pub fn split(&self) -> Option<(Decimal, Decimal)> {
        self.split
    }
}

/// How the tip on a bill is expressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TipMode {
    /// Percentage points of the bill total (e.g. `20` for 20%).
    Rate(Decimal),

    /// Flat amount for the whole table.
    Flat(Decimal),

    /// Gratuity is already part of the printed total.
    IncludedInTotal,
}

/// A snapshot of everything needed to work out one diner's share.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default)]
    items: Vec<Item>,

    /// Pre-tax total for the whole table
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    subtotal: Option<Decimal>,

    /// Post-tax total for the whole table, possibly including the tip
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    total: Option<Decimal>,

    /// Rate or flat amount, depending on `tip_is_rate`
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    tip: Option<Decimal>,

    #[serde(default)]
    tip_is_rate: bool,

    #[serde(default)]
    tip_included_in_total: bool,
}

impl Bill {
    /// Creates a bill from items with no totals and no tip.
    pub fn new(items: impl Into<Vec<Item>>) -> Self {
        Self {
            items: items.into(),
            ..Self::default()
        }
    }

    /// Creates the bill a new form starts with: one blank row and a 20% tip.
    pub fn fresh() -> Self {
        Self {
            items: vec![Item::blank()],
            tip: Some(DEFAULT_TIP_RATE),
            tip_is_rate: true,
            ..Self::default()
        }
    }

    /// Sets the whole-table subtotal.
    #[must_use]
    pub fn with_subtotal(mut self, subtotal: Decimal) -> Self {
        self.subtotal = Some(subtotal);
        self
    }

    /// Sets the whole-table total.
    #[must_use]
    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total = Some(total);
        self
    }

    /// Tips a percentage of the total.
    #[must_use]
    pub fn with_tip_rate(mut self, rate: Decimal) -> Self {
        self.tip = Some(rate);
        self.tip_is_rate = true;
        self.tip_included_in_total = false;
        self
    }

    /// Tips a flat amount.
    #[must_use]
    pub fn with_flat_tip(mut self, amount: Decimal) -> Self {
        self.tip = Some(amount);
        self.tip_is_rate = false;
        self.tip_included_in_total = false;
        self
    }

    /// Marks the tip as already part of the total.
    #[must_use]
    pub fn with_tip_included(mut self) -> Self {
        self.tip_included_in_total = true;
        self
    }

    /// Returns the line items
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the line items, mutably
    pub fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }

    /// Returns the whole-table subtotal, if known
    pub fn subtotal(&self) -> Option<Decimal> {
        self.subtotal
    }

    /// Returns the whole-table total, if known
    pub fn total(&self) -> Option<Decimal> {
        self.total
    }

    /// Returns the raw tip value
    pub fn tip(&self) -> Option<Decimal> {
        self.tip
    }

    /// Whether `tip` is in percentage points
    pub fn tip_is_rate(&self) -> bool {
        self.tip_is_rate
    }

    /// Whether the tip is already part of `total`
    pub fn tip_included_in_total(&self) -> bool {
        self.tip_included_in_total
    }

    /// Interprets the tip fields. A missing tip counts as zero.
    pub fn tip_mode(&self) -> TipMode {
        let tip = self.tip.unwrap_or(Decimal::ZERO);

        if self.tip_included_in_total {
            TipMode::IncludedInTotal
        } else if self.tip_is_rate {
            TipMode::Rate(tip)
        } else {
            TipMode::Flat(tip)
        }
    }

    /// Replaces the line items.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// Replaces the whole-table subtotal.
    pub fn set_subtotal(&mut self, subtotal: Option<Decimal>) {
        self.subtotal = subtotal;
    }

    /// Replaces the whole-table total.
    pub fn set_total(&mut self, total: Option<Decimal>) {
        self.total = total;
    }

    /// Replaces the raw tip value.
    pub fn set_tip(&mut self, tip: Option<Decimal>) {
        self.tip = tip;
    }

    /// Switches between rate and flat tips.
    pub fn set_tip_is_rate(&mut self, tip_is_rate: bool) {
        self.tip_is_rate = tip_is_rate;
    }

    /// Marks whether the tip is already part of the total.
    pub fn set_tip_included_in_total(&mut self, included: bool) {
        self.tip_included_in_total = included;
    }

    /// Appends a blank row.
    pub fn add_item(&mut self) {
        self.items.push(Item::blank());
    }

    /// Removes the row at `index`, returning it if it existed.
    pub fn remove_item(&mut self, index: usize) -> Option<Item> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Gives every item without an id a fresh one.
    pub fn ensure_item_ids(&mut self) {
        self.items.iter_mut().for_each(Item::ensure_id);
    }

    /// Narrows a shared bill to the items one diner claims.
    ///
    /// Items keep their bill order; unclaimed items and items without an id
    /// are dropped. Portions come from the pick, then the item, then `1`.
    /// Table amounts and tip settings are unchanged.
    #[must_use]
    pub fn selected(&self, picks: &[ItemPick]) -> Self {
        let items = self
            .items
            .iter()
            .filter_map(|item| {
                let pick = picks.iter().find(|pick| item.id() == Some(pick.id()))?;
                let (paying, total) = pick.split().unzip();

                let mut claimed = item.clone();
                claimed.set_portions_paying(Some(
                    paying.or(item.portions_paying()).unwrap_or(Decimal::ONE),
                ));
                claimed.set_total_portions(Some(
                    total.or(item.total_portions()).unwrap_or(Decimal::ONE),
                ));

                Some(claimed)
            })
            .collect();

        Self {
            items,
            ..self.clone()
        }
    }

    /// Ids in `picks` that match no item on the bill.
    pub fn unknown_picks<'a>(&self, picks: &'a [ItemPick]) -> Vec<&'a str> {
        picks
            .iter()
            .map(ItemPick::id)
            .filter(|id| !self.items.iter().any(|item| item.id() == Some(*id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_bill_has_one_blank_row_and_twenty_percent_tip() {
        let bill = Bill::fresh();

        assert_eq!(bill.items().len(), 1);
        assert_eq!(bill.tip_mode(), TipMode::Rate(Decimal::from(20)));
        assert!(!bill.tip_included_in_total(), "tip should not be included");
    }

    #[test]
    fn included_tip_wins_over_rate_and_flat() {
        let rate = Bill::default().with_tip_rate(Decimal::from(18)).with_tip_included();
        let flat = Bill::default().with_flat_tip(Decimal::from(5)).with_tip_included();

        assert_eq!(rate.tip_mode(), TipMode::IncludedInTotal);
        assert_eq!(flat.tip_mode(), TipMode::IncludedInTotal);
    }

    #[test]
    fn missing_tip_is_zero() {
        let mut bill = Bill::default();
        bill.set_tip_is_rate(true);

        assert_eq!(bill.tip_mode(), TipMode::Rate(Decimal::ZERO));

        bill.set_tip_is_rate(false);

        assert_eq!(bill.tip_mode(), TipMode::Flat(Decimal::ZERO));
    }

    #[test]
    fn add_and_remove_rows() {
        let mut bill = Bill::new(vec![Item::new(Decimal::ONE)]);
        bill.add_item();

        assert_eq!(bill.items().len(), 2);

        let removed = bill.remove_item(0);

        assert_eq!(removed.and_then(|item| item.cost()), Some(Decimal::ONE));
        assert_eq!(bill.items().len(), 1);
        assert!(bill.remove_item(5).is_none(), "out of range removal is a no-op");
    }

    #[test]
    fn ensure_item_ids_fills_gaps() {
        let mut bill = Bill::new(vec![Item::new(Decimal::ONE), Item::default().with_id("x")]);
        bill.ensure_item_ids();

        assert!(bill.items().iter().all(|item| item.id().is_some()), "every item should have an id");
        assert_eq!(bill.items().get(1).and_then(Item::id), Some("x"));
    }

    fn shared() -> Bill {
        Bill::new(vec![
            Item::new(Decimal::from(10)).with_id("a"),
            Item::new(Decimal::from(20)).with_portions(1, 2).with_id("b"),
            Item::new(Decimal::from(30)).with_id("c"),
        ])
        .with_subtotal(Decimal::from(60))
        .with_total(Decimal::from(66))
        .with_tip_rate(Decimal::from(20))
    }

    #[test]
    fn selected_keeps_only_claimed_items() {
        let mine = shared().selected(&[ItemPick::new("a")]);

        assert_eq!(mine.items().len(), 1);
        assert_eq!(mine.items().first().and_then(Item::id), Some("a"));
        assert_eq!(mine.subtotal(), Some(Decimal::from(60)));
        assert_eq!(mine.tip_mode(), TipMode::Rate(Decimal::from(20)));
    }

    #[test]
    fn selected_split_falls_back_to_item_then_one() {
        let mine = shared().selected(&[
            ItemPick::new("c").with_split(1, 3),
            ItemPick::new("b"),
            ItemPick::new("a"),
        ]);

        let splits: Vec<_> = mine
            .items()
            .iter()
            .map(|item| (item.id(), item.portions_paying(), item.total_portions()))
            .collect();

        assert_eq!(
            splits,
            vec![
                (Some("a"), Some(Decimal::ONE), Some(Decimal::ONE)),
                (Some("b"), Some(Decimal::ONE), Some(Decimal::from(2))),
                (Some("c"), Some(Decimal::ONE), Some(Decimal::from(3))),
            ]
        );
    }

    #[test]
    fn items_without_ids_cannot_be_claimed() {
        let bill = Bill::new(vec![Item::new(Decimal::ONE)]);

        assert!(
            bill.selected(&[ItemPick::new("")]).items().is_empty(),
            "an item without an id should never match"
        );
    }

    #[test]
    fn reports_unknown_picks() {
        let picks = [ItemPick::new("a"), ItemPick::new("zz")];

        assert_eq!(shared().unknown_picks(&picks), vec!["zz"]);
    }
}
