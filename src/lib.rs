//! Dinner Debt
//!
//! Dinner Debt works out what one diner owes for a shared restaurant bill:
//! their share of each item, plus tax and tip allocated in proportion to what
//! they ordered. Supporting modules cover receipt import, shareable links and
//! payment links.

pub mod bill;
pub mod debt;
pub mod expression;
pub mod items;
pub mod money;
pub mod payment;
pub mod prelude;
pub mod receipt;
pub mod settings;
pub mod share;

mod uri;
