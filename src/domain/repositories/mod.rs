//! Repository access for the domain layer

use super::customer::{CustomerRepository, UsageRepository};
use super::entitlement::EntitlementRepository;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let usage = repos.usage().load_usage("c1").await?;
///     let premium = repos.entitlements().has_product("c1", "insights").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn customers(&self) -> &dyn CustomerRepository;
    fn usage(&self) -> &dyn UsageRepository;
    fn entitlements(&self) -> &dyn EntitlementRepository;
}
