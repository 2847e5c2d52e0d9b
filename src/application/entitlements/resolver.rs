//! Entitlement resolver
//!
//! The single place that answers "does this customer hold product X".
//! Both quota paths go through [`EntitlementResolver::has_unlimited_usage`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{DomainError, DomainResult, RepositoryProvider};

pub struct EntitlementResolver {
    repos: Arc<dyn RepositoryProvider>,
    unlimited_product: String,
}

impl EntitlementResolver {
    pub fn new(repos: Arc<dyn RepositoryProvider>, unlimited_product: impl Into<String>) -> Self {
        Self {
            repos,
            unlimited_product: unlimited_product.into(),
        }
    }

    pub fn unlimited_product(&self) -> &str {
        &self.unlimited_product
    }

    /// `Ok(false)` when the customer does not hold the product.
    /// Any store failure is a `ResolutionFailure`, never `Ok(false)`.
    pub async fn has_entitlement(&self, customer_id: &str, product_id: &str) -> DomainResult<bool> {
        match self.repos.entitlements().has_product(customer_id, product_id).await {
            Ok(held) => {
                debug!(customer_id, product_id, held, "Entitlement resolved");
                Ok(held)
            }
            Err(DomainError::ResolutionFailure(reason)) => {
                warn!(customer_id, product_id, %reason, "Entitlement lookup failed");
                Err(DomainError::ResolutionFailure(reason))
            }
            Err(e) => {
                warn!(customer_id, product_id, error = %e, "Entitlement lookup failed");
                Err(DomainError::ResolutionFailure(e.to_string()))
            }
        }
    }

    pub async fn has_unlimited_usage(&self, customer_id: &str) -> DomainResult<bool> {
        self.has_entitlement(customer_id, &self.unlimited_product)
            .await
    }
}
