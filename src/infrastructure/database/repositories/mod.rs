//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod customer_repository;
pub mod entitlement_repository;
pub mod repository_provider;

pub use customer_repository::SeaOrmCustomerRepository;
pub use entitlement_repository::SeaOrmEntitlementRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
