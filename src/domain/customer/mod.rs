//! Customer aggregate
//!
//! The customer row carries the usage counter and the start of its counting
//! period alongside the account fields.

pub mod model;
pub mod repository;

pub use model::{Customer, NewCustomer, UsageSnapshot};
pub use repository::{CustomerRepository, UsageRepository};
