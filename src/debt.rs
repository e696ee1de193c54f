//! Debt calculation
//!
//! Works out how much one diner owes for a shared bill. Item shares are summed
//! first, then tax (`total - subtotal`) and tip are allocated in proportion to
//! the diner's share of the pre-tax subtotal, so two diners with the same
//! pre-tax spend always owe the same amount.
//!
//! The calculation never fails. Degenerate inputs (no subtotal and nothing
//! ordered, or amounts too large for a [`Decimal`]) produce zero.

use rust_decimal::Decimal;
use tracing::warn;

use crate::{
    bill::{Bill, TipMode},
    items::Item,
};

/// Raised internally when an intermediate amount leaves the decimal range.
#[derive(Debug)]
struct Overflow;

/// One diner's share of a bill, split into its parts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DebtBreakdown {
    my_subtotal: Decimal,
    my_tax: Decimal,
    my_tip: Decimal,
    my_fees: Decimal,
    total: Decimal,
}

impl DebtBreakdown {
    /// Allocates tax and tip on `bill` to the current diner.
    pub fn from_bill(bill: &Bill) -> Self {
        allocate(bill).unwrap_or_else(|Overflow| {
            warn!(
                items = bill.items().len(),
                "bill amounts overflowed the decimal range; treating debt as zero"
            );

            Self::default()
        })
    }

    /// Pre-tax cost of the diner's items
    pub fn my_subtotal(&self) -> Decimal {
        self.my_subtotal
    }

    /// Diner's share of tax, including any tip folded into the total
    pub fn my_tax(&self) -> Decimal {
        self.my_tax
    }

    /// Diner's share of the tip added on top of the total.
    ///
    /// Computed as `my_fees - my_tax` rather than `tip * ratio`, so the parts
    /// sum to [`DebtBreakdown::total`] exactly. The two can differ in the
    /// last of 28 digits.
    pub fn my_tip(&self) -> Decimal {
        self.my_tip
    }

    /// Diner's share of tax and tip together; always `my_tax + my_tip`
    pub fn my_fees(&self) -> Decimal {
        self.my_fees
    }

    /// Everything the diner owes
    pub fn total(&self) -> Decimal {
        self.total
    }
}

/// Returns the amount the current diner owes, inclusive of their share of tax and tip.
///
/// No currency rounding is applied.
pub fn calculate_debt(bill: &Bill) -> Decimal {
    DebtBreakdown::from_bill(bill).total()
}

/// Sums the current diner's share of every item.
///
/// An empty slice sums to zero, as does a list whose shares overflow.
pub fn my_subtotal(items: &[Item]) -> Decimal {
    sum_shares(items).unwrap_or_else(|Overflow| {
        warn!(items = items.len(), "item shares overflowed the decimal range");

        Decimal::ZERO
    })
}

fn sum_shares(items: &[Item]) -> Result<Decimal, Overflow> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        item.my_share()
            .and_then(|share| acc.checked_add(share))
            .ok_or(Overflow)
    })
}

fn allocate(bill: &Bill) -> Result<DebtBreakdown, Overflow> {
    let my_subtotal = sum_shares(bill.items())?;

    // A zero subtotal is indistinguishable from an unknown one
    let known_subtotal = bill.subtotal().filter(|subtotal| !subtotal.is_zero());

    if known_subtotal.is_none() && my_subtotal.is_zero() {
        return Ok(DebtBreakdown::default());
    }

    let subtotal = known_subtotal.unwrap_or(my_subtotal);
    let total = bill.total().unwrap_or(subtotal);

    let tax = total.checked_sub(subtotal).ok_or(Overflow)?;
    let tip = tip_cost(bill.tip_mode(), total)?;
    let fees = tax.checked_add(tip).ok_or(Overflow)?;

    let my_ratio = my_subtotal.checked_div(subtotal).ok_or(Overflow)?;
    let my_fees = fees.checked_mul(my_ratio).ok_or(Overflow)?;
    let my_tax = tax.checked_mul(my_ratio).ok_or(Overflow)?;

    // derived from the fee share so the parts always add back up exactly
    let my_tip = my_fees.checked_sub(my_tax).ok_or(Overflow)?;
    let total = my_subtotal.checked_add(my_fees).ok_or(Overflow)?;

    Ok(DebtBreakdown {
        my_subtotal,
        my_tax,
        my_tip,
        my_fees,
        total,
    })
}

/// Whole-table tip to allocate. Rates apply to the post-tax total.
fn tip_cost(mode: TipMode, total: Decimal) -> Result<Decimal, Overflow> {
    match mode {
        TipMode::IncludedInTotal => Ok(Decimal::ZERO),
        TipMode::Flat(amount) => Ok(amount),
        TipMode::Rate(rate) => total
            .checked_mul(rate)
            .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(Overflow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(cost: i64, paying: i64, total: i64) -> Item {
        Item::new(Decimal::from(cost)).with_portions(paying, total)
    }

    fn cents(value: i64) -> Decimal {
        Decimal::new(value, 2)
    }

    fn rate_bill(items: Vec<Item>, subtotal: Decimal, total: Decimal, rate: i64) -> Bill {
        Bill::new(items)
            .with_subtotal(subtotal)
            .with_total(total)
            .with_tip_rate(Decimal::from(rate))
    }

    fn debt(bill: &Bill) -> Decimal {
        calculate_debt(bill).round_dp(2)
    }

    #[test]
    fn single_unsplit_item() {
        let bill = rate_bill(vec![item(10, 1, 1)], cents(10_00), cents(11_00), 20);

        // $10 + $1 tax + $2.20 tip on the $11 total
        assert_eq!(debt(&bill), cents(13_20));
    }

    #[test]
    fn multiple_unsplit_items() {
        let bill = rate_bill(
            vec![item(10, 1, 1), item(15, 1, 1)],
            cents(25_00),
            cents(27_50),
            20,
        );

        assert_eq!(debt(&bill), cents(33_00));
    }

    #[test]
    fn flat_tip_is_not_scaled() {
        let bill = Bill::new(vec![item(10, 1, 1)])
            .with_subtotal(cents(10_00))
            .with_total(cents(11_00))
            .with_flat_tip(cents(5_00));

        assert_eq!(debt(&bill), cents(16_00));
    }

    #[test]
    fn tip_included_in_total_is_allocated_as_tax() {
        let bill = rate_bill(vec![item(10, 1, 1)], cents(10_00), cents(13_00), 0).with_tip_included();

        assert_eq!(debt(&bill), cents(13_00));
    }

    #[test]
    fn item_split_three_ways() {
        let bill = rate_bill(vec![item(30, 1, 3)], cents(30_00), cents(33_00), 20);

        assert_eq!(debt(&bill), cents(13_20));
    }

    #[test]
    fn paying_two_of_three_portions() {
        let bill = rate_bill(vec![item(30, 2, 3)], cents(30_00), cents(33_00), 20);

        assert_eq!(debt(&bill), cents(26_40));
    }

    #[test]
    fn mixed_split_and_unsplit_items() {
        let bill = rate_bill(
            vec![item(10, 1, 1), item(20, 1, 2), item(15, 1, 1)],
            cents(45_00),
            cents(49_50),
            20,
        );

        assert_eq!(debt(&bill), cents(46_20));
    }

    #[test]
    fn fees_follow_share_of_subtotal() {
        let bill = rate_bill(vec![item(10, 1, 1)], cents(100_00), cents(110_00), 20);

        assert_eq!(debt(&bill), cents(13_20));
    }

    #[test]
    fn paying_three_quarters_of_an_item() {
        let bill = rate_bill(vec![item(30, 3, 4)], cents(40_00), cents(44_00), 20);

        assert_eq!(debt(&bill), cents(29_70));
    }

    #[test]
    fn missing_subtotal_uses_my_items() {
        let mut bill = rate_bill(
            vec![item(10, 1, 1), item(15, 1, 1)],
            Decimal::ZERO,
            cents(27_50),
            20,
        );
        bill.set_subtotal(None);

        assert_eq!(debt(&bill), cents(33_00));
    }

    #[test]
    fn missing_total_uses_subtotal() {
        let mut bill = rate_bill(vec![item(10, 1, 1)], cents(10_00), Decimal::ZERO, 20);
        bill.set_total(None);

        assert_eq!(debt(&bill), cents(12_00));
    }

    #[test]
    fn missing_subtotal_and_total() {
        let bill = Bill::new(vec![item(10, 1, 1)]).with_tip_rate(Decimal::from(20));

        assert_eq!(debt(&bill), cents(12_00));
    }

    #[test]
    fn missing_cost_counts_as_zero() {
        let bill = rate_bill(
            vec![Item::default().with_portions(1, 1), item(10, 1, 1)],
            cents(10_00),
            cents(11_00),
            20,
        );

        assert_eq!(debt(&bill), cents(13_20));
    }

    #[test]
    fn missing_portions_mean_one_of_one() {
        let bill = rate_bill(vec![Item::new(Decimal::from(10))], cents(10_00), cents(11_00), 20);

        assert_eq!(debt(&bill), cents(13_20));
    }

    #[test]
    fn empty_items_owe_nothing() {
        let bill = rate_bill(Vec::new(), Decimal::ZERO, Decimal::ZERO, 20);

        assert_eq!(calculate_debt(&bill), Decimal::ZERO);
    }

    #[test]
    fn zero_subtotal_and_zero_items_short_circuit() {
        let bill = rate_bill(vec![item(0, 1, 1)], Decimal::ZERO, Decimal::ZERO, 20);

        assert_eq!(calculate_debt(&bill), Decimal::ZERO);
    }

    #[test]
    fn zero_subtotal_with_items_falls_back_to_my_subtotal() {
        let bill = rate_bill(vec![item(10, 1, 1)], Decimal::ZERO, cents(11_00), 20);

        // behaves as if the subtotal were unknown
        assert_eq!(debt(&bill), cents(13_20));
    }

    #[test]
    fn zero_tip() {
        let bill = rate_bill(vec![item(10, 1, 1)], cents(10_00), cents(11_00), 0);

        assert_eq!(debt(&bill), cents(11_00));
    }

    #[test]
    fn zero_total_portions_act_as_one() {
        let bill = rate_bill(vec![item(10, 1, 0)], cents(10_00), cents(11_00), 20);

        assert_eq!(debt(&bill), cents(13_20));
    }

    #[test]
    fn negative_total_portions_use_magnitude() {
        let bill = rate_bill(vec![item(20, 1, -3)], cents(20_00), cents(22_00), 20);

        assert_eq!(debt(&bill), cents(8_80));
    }

    #[test]
    fn four_way_appetizer_dinner() {
        let bill = rate_bill(
            vec![item(12, 1, 4), item(18, 1, 1), item(30, 1, 2)],
            cents(100_00),
            cents(115_00),
            18,
        );

        assert_eq!(debt(&bill), cents(48_85));
    }

    #[test]
    fn paying_for_someone_else_entirely() {
        let bill = rate_bill(vec![item(10, 2, 2)], cents(10_00), cents(11_00), 20);

        assert_eq!(debt(&bill), cents(13_20));
    }

    #[test]
    fn part_of_a_larger_table() {
        let bill = rate_bill(
            vec![item(15, 1, 1), item(20, 1, 2)],
            cents(80_00),
            cents(92_00),
            20,
        );

        assert_eq!(debt(&bill), cents(34_50));
    }

    #[test]
    fn typical_restaurant_receipt() {
        let bill = rate_bill(
            vec![item(23, 1, 1), item(3, 1, 1), item(12, 1, 3)],
            cents(67_00),
            cents(75_50),
            20,
        );

        assert_eq!(debt(&bill), cents(40_57));
    }

    #[test]
    fn total_below_subtotal_propagates_negative_tax() {
        let bill = rate_bill(vec![item(10, 1, 1)], cents(10_00), cents(9_00), 0);

        assert_eq!(debt(&bill), cents(9_00));
    }

    #[test]
    fn breakdown_parts_add_up_to_debt() {
        let bill = rate_bill(
            vec![item(10, 1, 1), item(20, 1, 2), item(15, 1, 1)],
            cents(45_00),
            cents(49_50),
            20,
        );
        let breakdown = DebtBreakdown::from_bill(&bill);

        assert_eq!(breakdown.my_tax() + breakdown.my_tip(), breakdown.my_fees());
        assert_eq!(breakdown.total(), calculate_debt(&bill));
        assert_eq!(breakdown.my_subtotal(), Decimal::from(35));
        assert_eq!(breakdown.my_tax().round_dp(2), cents(3_50));
        assert_eq!(breakdown.my_tip().round_dp(2), cents(7_70));
    }

    #[test]
    fn breakdown_with_included_tip_has_no_tip_share() {
        let bill = rate_bill(vec![item(10, 1, 1)], cents(10_00), cents(13_00), 20).with_tip_included();
        let breakdown = DebtBreakdown::from_bill(&bill);

        assert_eq!(breakdown.my_tip(), Decimal::ZERO);
        assert_eq!(breakdown.my_tax(), Decimal::from(3));
    }

    #[test]
    fn overflow_degrades_to_zero() {
        let bill = Bill::new(vec![Item::new(Decimal::MAX), Item::new(Decimal::MAX)]);

        assert_eq!(calculate_debt(&bill), Decimal::ZERO);
        assert_eq!(my_subtotal(bill.items()), Decimal::ZERO);
    }

    #[test]
    fn my_subtotal_of_nothing_is_zero() {
        assert_eq!(my_subtotal(&[]), Decimal::ZERO);
    }
}
