use async_trait::async_trait;

use crate::domain::DomainResult;

#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// `Ok(false)` when no row exists. `Err` only when the store itself failed.
    async fn has_product(&self, customer_id: &str, product_id: &str) -> DomainResult<bool>;
}
