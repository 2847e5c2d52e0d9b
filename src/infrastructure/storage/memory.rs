//! In-memory storage for development and testing
//!
//! Each usage mutation runs under the DashMap shard lock of the customer
//! entry, so it is as atomic as the single-statement SQL updates.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    Customer, CustomerRepository, DomainError, DomainResult, EntitlementRepository, NewCustomer,
    RepositoryProvider, UsageRepository, UsageSnapshot,
};

pub struct InMemoryStorage {
    customers: DashMap<String, Customer>,
    /// email -> customer id
    emails: DashMap<String, String>,
    /// customer id -> product ids
    entitlements: DashMap<String, HashSet<String>>,
    entitlements_unavailable: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            customers: DashMap::new(),
            emails: DashMap::new(),
            entitlements: DashMap::new(),
            entitlements_unavailable: AtomicBool::new(false),
        }
    }

    /// Grant a product entitlement
    pub fn grant(&self, customer_id: &str, product_id: &str) {
        self.entitlements
            .entry(customer_id.to_string())
            .or_default()
            .insert(product_id.to_string());
    }

    pub fn revoke(&self, customer_id: &str, product_id: &str) {
        if let Some(mut products) = self.entitlements.get_mut(customer_id) {
            products.remove(product_id);
        }
    }

    /// Overwrite the usage counter state of an existing customer
    pub fn set_usage(&self, customer_id: &str, usage: UsageSnapshot) -> DomainResult<()> {
        let mut customer = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| DomainError::CustomerNotFound(customer_id.to_string()))?;
        customer.usage_count = usage.usage_count;
        customer.usage_reset_date = usage.usage_reset_date;
        Ok(())
    }

    /// Simulate an unreachable entitlement store
    pub fn set_entitlements_unavailable(&self, unavailable: bool) {
        self.entitlements_unavailable
            .store(unavailable, Ordering::SeqCst);
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryStorage {
    async fn create(&self, new: NewCustomer) -> DomainResult<Customer> {
        let email = new.email.to_lowercase();
        let id = uuid::Uuid::new_v4().to_string();

        match self.emails.entry(email.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "Customer with email '{}' already exists",
                email
            ))),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let customer = Customer {
                    id: id.clone(),
                    email,
                    password_hash: new.password_hash,
                    shop_name: new.shop_name,
                    access_key: new.access_key,
                    data_consent: true,
                    consent_updated_at: Some(now),
                    signup_date: now,
                    last_login: None,
                    usage_count: 0,
                    usage_reset_date: now,
                    is_premium: false,
                    is_email_verified: false,
                };
                self.customers.insert(id.clone(), customer.clone());
                slot.insert(id);
                Ok(customer)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Customer>> {
        Ok(self.customers.get(id).map(|c| c.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Customer>> {
        let Some(id) = self.emails.get(&email.to_lowercase()).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.customers.get(&id).map(|c| c.clone()))
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let mut customer = self
            .customers
            .get_mut(id)
            .ok_or_else(|| DomainError::CustomerNotFound(id.to_string()))?;
        customer.last_login = Some(at);
        Ok(())
    }
}

#[async_trait]
impl UsageRepository for InMemoryStorage {
    async fn load_usage(&self, customer_id: &str) -> DomainResult<UsageSnapshot> {
        self.customers
            .get(customer_id)
            .map(|c| c.usage())
            .ok_or_else(|| DomainError::CustomerNotFound(customer_id.to_string()))
    }

    async fn reset_usage_if_unchanged(
        &self,
        customer_id: &str,
        observed: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut customer = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| DomainError::CustomerNotFound(customer_id.to_string()))?;

        if customer.usage_reset_date != observed || observed >= now {
            return Err(DomainError::ConcurrencyConflict(customer_id.to_string()));
        }
        customer.usage_count = 0;
        customer.usage_reset_date = now;
        Ok(())
    }

    async fn increment_usage(&self, customer_id: &str) -> DomainResult<()> {
        let mut customer = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| DomainError::CustomerNotFound(customer_id.to_string()))?;
        customer.usage_count = customer.usage_count.saturating_add(1);
        Ok(())
    }

    async fn increment_usage_below(&self, customer_id: &str, limit: u32) -> DomainResult<bool> {
        let mut customer = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| DomainError::CustomerNotFound(customer_id.to_string()))?;
        if customer.usage_count >= limit {
            return Ok(false);
        }
        customer.usage_count += 1;
        Ok(true)
    }
}

#[async_trait]
impl EntitlementRepository for InMemoryStorage {
    async fn has_product(&self, customer_id: &str, product_id: &str) -> DomainResult<bool> {
        if self.entitlements_unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::ResolutionFailure(
                "entitlement store unavailable".into(),
            ));
        }
        Ok(self
            .entitlements
            .get(customer_id)
            .is_some_and(|products| products.contains(product_id)))
    }
}

impl RepositoryProvider for InMemoryStorage {
    fn customers(&self) -> &dyn CustomerRepository {
        self
    }

    fn usage(&self) -> &dyn UsageRepository {
        self
    }

    fn entitlements(&self) -> &dyn EntitlementRepository {
        self
    }
}
