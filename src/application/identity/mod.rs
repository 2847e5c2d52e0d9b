//! Identity module: customer registration, login and profile
//!
//! Contains the `IdentityService` which orchestrates the account use-cases
//! around the `customers` table.

pub mod service;

pub use service::{AuthResult, CustomerInfo, IdentityService};
