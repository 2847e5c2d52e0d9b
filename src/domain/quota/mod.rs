//! Usage quota: period arithmetic and per-check decisions

pub mod model;

pub use model::{PeriodState, QuotaDecision, QuotaLimit, QuotaPolicy};
