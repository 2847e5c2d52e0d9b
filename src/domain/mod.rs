//! Domain layer: customers, entitlements, usage quota and fee calculation.

pub mod customer;
pub mod entitlement;
pub mod fees;
pub mod quota;
pub mod repositories;

pub use customer::{Customer, CustomerRepository, NewCustomer, UsageRepository, UsageSnapshot};
pub use entitlement::{EntitlementRepository, UNLIMITED_USAGE_PRODUCT};
pub use fees::{calculate_fees, round_money, FeeBreakdown, FeeSchedule, OffsiteAdsTier, SaleInput};
pub use quota::{PeriodState, QuotaDecision, QuotaLimit, QuotaPolicy};
pub use repositories::RepositoryProvider;

pub use crate::shared::types::errors::{DomainError, DomainResult};
