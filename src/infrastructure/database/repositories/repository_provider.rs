//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::{CustomerRepository, EntitlementRepository, UsageRepository};

use super::customer_repository::SeaOrmCustomerRepository;
use super::entitlement_repository::SeaOrmEntitlementRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let usage = repos.usage().load_usage(&customer_id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    customers: SeaOrmCustomerRepository,
    entitlements: SeaOrmEntitlementRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            customers: SeaOrmCustomerRepository::new(db.clone()),
            entitlements: SeaOrmEntitlementRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn customers(&self) -> &dyn CustomerRepository {
        &self.customers
    }

    fn usage(&self) -> &dyn UsageRepository {
        &self.customers
    }

    fn entitlements(&self) -> &dyn EntitlementRepository {
        &self.entitlements
    }
}
