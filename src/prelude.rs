//! Dinner Debt prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    bill::{Bill, ItemPick, TipMode},
    debt::{DebtBreakdown, calculate_debt, my_subtotal},
    expression::{ExpressionError, evaluate, evaluate_or},
    items::Item,
    money::{format_amount, payment_amount, round_to_currency},
    payment::{PaymentRequest, Platform},
    receipt::{ReceiptData, ReceiptError, ReceiptImage, ReceiptItem, ReceiptReader},
    settings::{JsonFileStore, MemoryStore, Settings, SettingsError, SettingsStore},
    share::{ShareError, SharedState},
};
