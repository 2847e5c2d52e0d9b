//! Application layer: use-case orchestration over the domain

pub mod entitlements;
pub mod fees;
pub mod identity;
pub mod quota;

pub use entitlements::EntitlementResolver;
pub use fees::{FeeCalculator, MeteredFeeResult, MeteredFeeService};
pub use identity::{AuthResult, CustomerInfo, IdentityService};
pub use quota::QuotaManager;
