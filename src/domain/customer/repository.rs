use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Customer, NewCustomer, UsageSnapshot};
use crate::domain::DomainResult;

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a new customer with a zeroed counter and a reset date of now.
    /// A duplicate email is a `Conflict`.
    async fn create(&self, customer: NewCustomer) -> DomainResult<Customer>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Customer>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Customer>>;
    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()>;
}

/// Usage counter storage.
///
/// Every mutation is one atomic operation against the store; implementations
/// must never read the row and write it back in a separate step.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Missing customer is `CustomerNotFound`.
    async fn load_usage(&self, customer_id: &str) -> DomainResult<UsageSnapshot>;

    /// Set `usage_count = 0` and `usage_reset_date = now` if, and only if, the
    /// stored reset date still equals `observed` and `now` is later than it.
    ///
    /// Returns `ConcurrencyConflict` when another writer got there first and
    /// `CustomerNotFound` when the row is gone.
    async fn reset_usage_if_unchanged(
        &self,
        customer_id: &str,
        observed: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// `usage_count = usage_count + 1` as a single statement.
    async fn increment_usage(&self, customer_id: &str) -> DomainResult<()>;

    /// `usage_count = usage_count + 1` only while `usage_count < limit`, as a
    /// single conditional statement.
    ///
    /// Returns `false` when the counter is already at the limit.
    async fn increment_usage_below(&self, customer_id: &str, limit: u32) -> DomainResult<bool>;
}
