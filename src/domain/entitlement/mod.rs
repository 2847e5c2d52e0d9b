//! Entitlements: product ids a customer holds through its subscription.
//! Read-only from this service's point of view.

pub mod repository;

pub use repository::EntitlementRepository;

/// Product id granting unlimited metered usage.
pub const UNLIMITED_USAGE_PRODUCT: &str = "insights";
