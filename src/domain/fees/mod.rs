//! Sale fee and margin calculation
//!
//! Pure functions over `rust_decimal::Decimal`; no I/O, no shared state.

pub mod model;

pub use model::{calculate_fees, round_money, FeeBreakdown, FeeSchedule, OffsiteAdsTier, SaleInput};
