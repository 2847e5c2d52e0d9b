//! Fee calculation services

pub mod calculator;
pub mod metered;

pub use calculator::FeeCalculator;
pub use metered::{MeteredFeeResult, MeteredFeeService};
