//! Quota manager
//!
//! Owns the per-customer usage counter and the start of its counting period.
//! Resets are lazy: an expired period is detected and reset on the next
//! check, never by a background job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::application::entitlements::EntitlementResolver;
use crate::domain::{
    DomainError, DomainResult, PeriodState, QuotaDecision, QuotaLimit, QuotaPolicy,
    RepositoryProvider,
};

pub struct QuotaManager {
    repos: Arc<dyn RepositoryProvider>,
    entitlements: Arc<EntitlementResolver>,
    policy: QuotaPolicy,
}

impl QuotaManager {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        entitlements: Arc<EntitlementResolver>,
        policy: QuotaPolicy,
    ) -> Self {
        Self {
            repos,
            entitlements,
            policy,
        }
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Decide whether the customer may run a metered operation, resetting
    /// the counter first when its period has lapsed.
    pub async fn check_and_reset(&self, customer_id: &str) -> DomainResult<QuotaDecision> {
        self.check_and_reset_at(customer_id, Utc::now()).await
    }

    /// [`check_and_reset`](Self::check_and_reset) against an explicit clock.
    pub async fn check_and_reset_at(
        &self,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<QuotaDecision> {
        let usage = self.repos.usage().load_usage(customer_id).await?;

        if self.entitlements.has_unlimited_usage(customer_id).await? {
            metrics::counter!("quota_checks_total", "outcome" => "unbounded").increment(1);
            debug!(customer_id, count = usage.usage_count, "Unlimited entitlement, quota bypassed");
            return Ok(QuotaDecision {
                count: usage.usage_count,
                limit: QuotaLimit::Unbounded,
                reset_occurred: false,
            });
        }

        let limit = QuotaLimit::Limited(self.policy.free_tier_limit);

        let decision = match self.policy.period_state(usage.usage_reset_date, now) {
            PeriodState::PeriodExpired => {
                self.repos
                    .usage()
                    .reset_usage_if_unchanged(customer_id, usage.usage_reset_date, now)
                    .await?;

                metrics::counter!("quota_resets_total").increment(1);
                info!(
                    customer_id,
                    previous_count = usage.usage_count,
                    previous_reset = %usage.usage_reset_date,
                    "Usage period expired, counter reset"
                );
                QuotaDecision {
                    count: 0,
                    limit,
                    reset_occurred: true,
                }
            }
            PeriodState::WithinPeriod => QuotaDecision {
                count: usage.usage_count,
                limit,
                reset_occurred: false,
            },
        };

        let outcome = if decision.allowed() { "allowed" } else { "blocked" };
        metrics::counter!("quota_checks_total", "outcome" => outcome).increment(1);
        debug!(
            customer_id,
            count = decision.count,
            limit = self.policy.free_tier_limit,
            outcome,
            "Quota checked"
        );

        Ok(decision)
    }

    /// Current standing without mutating anything. An expired period reads
    /// as a count of 0; the actual reset happens on the next check.
    pub async fn peek(&self, customer_id: &str) -> DomainResult<QuotaDecision> {
        let usage = self.repos.usage().load_usage(customer_id).await?;

        if self.entitlements.has_unlimited_usage(customer_id).await? {
            return Ok(QuotaDecision {
                count: usage.usage_count,
                limit: QuotaLimit::Unbounded,
                reset_occurred: false,
            });
        }

        let count = match self.policy.period_state(usage.usage_reset_date, Utc::now()) {
            PeriodState::PeriodExpired => 0,
            PeriodState::WithinPeriod => usage.usage_count,
        };
        Ok(QuotaDecision {
            count,
            limit: QuotaLimit::Limited(self.policy.free_tier_limit),
            reset_occurred: false,
        })
    }

    /// Record one metered operation. No-op for unlimited customers.
    ///
    /// Does not check the limit; callers run [`check_and_reset`](Self::check_and_reset) first.
    pub async fn increment(&self, customer_id: &str) -> DomainResult<()> {
        if self.entitlements.has_unlimited_usage(customer_id).await? {
            debug!(customer_id, "Unlimited entitlement, usage not recorded");
            return Ok(());
        }

        self.repos.usage().increment_usage(customer_id).await?;
        metrics::counter!("usage_increments_total").increment(1);
        debug!(customer_id, "Usage recorded");
        Ok(())
    }

    /// Record one metered operation only if the customer is still under the
    /// limit at write time, and return the standing after it.
    ///
    /// Two requests that both passed [`check_and_reset`](Self::check_and_reset)
    /// at `limit - 1` cannot both be recorded: the loser gets `QuotaExceeded`.
    pub async fn increment_within_limit(&self, customer_id: &str) -> DomainResult<QuotaDecision> {
        if self.entitlements.has_unlimited_usage(customer_id).await? {
            let usage = self.repos.usage().load_usage(customer_id).await?;
            return Ok(QuotaDecision {
                count: usage.usage_count,
                limit: QuotaLimit::Unbounded,
                reset_occurred: false,
            });
        }

        let limit = self.policy.free_tier_limit;
        let recorded = self
            .repos
            .usage()
            .increment_usage_below(customer_id, limit)
            .await?;

        let usage = self.repos.usage().load_usage(customer_id).await?;
        if !recorded {
            metrics::counter!("quota_checks_total", "outcome" => "blocked").increment(1);
            info!(customer_id, count = usage.usage_count, limit, "Usage limit reached at write time");
            return Err(DomainError::QuotaExceeded {
                count: usage.usage_count,
                limit,
            });
        }

        metrics::counter!("usage_increments_total").increment(1);
        debug!(customer_id, count = usage.usage_count, "Usage recorded");
        Ok(QuotaDecision {
            count: usage.usage_count,
            limit: QuotaLimit::Limited(limit),
            reset_occurred: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerRepository, DomainError, NewCustomer, UsageRepository, UsageSnapshot};
    use crate::infrastructure::storage::InMemoryStorage;
    use chrono::Duration;

    async fn setup() -> (Arc<InMemoryStorage>, QuotaManager, String) {
        let storage = Arc::new(InMemoryStorage::new());
        let customer = storage
            .create(NewCustomer {
                email: "maker@example.com".into(),
                password_hash: "hash".into(),
                shop_name: None,
                access_key: "key".into(),
            })
            .await
            .unwrap();

        let resolver = Arc::new(EntitlementResolver::new(storage.clone(), "insights"));
        let manager = QuotaManager::new(storage.clone(), resolver, QuotaPolicy::default());
        (storage, manager, customer.id)
    }

    fn seed(storage: &InMemoryStorage, id: &str, count: u32, reset: DateTime<Utc>) {
        storage
            .set_usage(
                id,
                UsageSnapshot {
                    usage_count: count,
                    usage_reset_date: reset,
                },
            )
            .unwrap();
    }

    #[tokio::test]
    async fn fresh_customer_is_allowed() {
        let (_, manager, id) = setup().await;
        let decision = manager.check_and_reset(&id).await.unwrap();

        assert_eq!(decision.count, 0);
        assert_eq!(decision.limit, QuotaLimit::Limited(10));
        assert!(!decision.reset_occurred);
        assert!(decision.allowed());
    }

    #[tokio::test]
    async fn blocked_at_limit_within_period() {
        let (storage, manager, id) = setup().await;
        let now = Utc::now();
        seed(&storage, &id, 10, now - Duration::days(3));

        let decision = manager.check_and_reset_at(&id, now).await.unwrap();
        assert_eq!(decision.count, 10);
        assert!(!decision.allowed());
        assert!(!decision.reset_occurred);
    }

    #[tokio::test]
    async fn expired_period_resets_once() {
        let (storage, manager, id) = setup().await;
        let now = Utc::now();
        seed(&storage, &id, 10, now - Duration::days(8));

        let first = manager.check_and_reset_at(&id, now).await.unwrap();
        assert_eq!(first.count, 0);
        assert!(first.reset_occurred);
        assert!(first.allowed());

        let usage = storage.load_usage(&id).await.unwrap();
        assert_eq!(usage.usage_count, 0);
        assert_eq!(usage.usage_reset_date, now);

        let second = manager.check_and_reset_at(&id, now).await.unwrap();
        assert_eq!(second.count, 0);
        assert!(!second.reset_occurred);
        assert_eq!(storage.load_usage(&id).await.unwrap(), usage);
    }

    #[tokio::test]
    async fn exactly_one_period_resets() {
        let (storage, manager, id) = setup().await;
        let now = Utc::now();
        seed(&storage, &id, 4, now - Duration::days(7));

        assert!(manager.check_and_reset_at(&id, now).await.unwrap().reset_occurred);
    }

    #[tokio::test]
    async fn future_reset_date_is_not_reset() {
        let (storage, manager, id) = setup().await;
        let now = Utc::now();
        seed(&storage, &id, 2, now + Duration::days(30));

        let decision = manager.check_and_reset_at(&id, now).await.unwrap();
        assert!(!decision.reset_occurred);
        assert_eq!(decision.count, 2);
    }

    #[tokio::test]
    async fn unlimited_customer_is_never_reset_or_counted() {
        let (storage, manager, id) = setup().await;
        let now = Utc::now();
        let long_ago = now - Duration::days(60);
        seed(&storage, &id, 42, long_ago);
        storage.grant(&id, "insights");

        let decision = manager.check_and_reset_at(&id, now).await.unwrap();
        assert_eq!(decision.limit, QuotaLimit::Unbounded);
        assert_eq!(decision.count, 42);
        assert!(!decision.reset_occurred);
        assert!(decision.allowed());

        manager.increment(&id).await.unwrap();
        let usage = storage.load_usage(&id).await.unwrap();
        assert_eq!(usage.usage_count, 42);
        assert_eq!(usage.usage_reset_date, long_ago);
    }

    #[tokio::test]
    async fn peek_does_not_reset() {
        let (storage, manager, id) = setup().await;
        let old = Utc::now() - Duration::days(9);
        seed(&storage, &id, 7, old);

        let view = manager.peek(&id).await.unwrap();
        assert_eq!(view.count, 0);
        assert!(!view.reset_occurred);

        let usage = storage.load_usage(&id).await.unwrap();
        assert_eq!(usage.usage_count, 7);
        assert_eq!(usage.usage_reset_date, old);
    }

    #[tokio::test]
    async fn increment_adds_one() {
        let (storage, manager, id) = setup().await;
        manager.increment(&id).await.unwrap();
        manager.increment(&id).await.unwrap();
        assert_eq!(storage.load_usage(&id).await.unwrap().usage_count, 2);
    }

    #[tokio::test]
    async fn missing_customer() {
        let (_, manager, _) = setup().await;
        assert!(matches!(
            manager.check_and_reset("ghost").await,
            Err(DomainError::CustomerNotFound(_))
        ));
        assert!(matches!(
            manager.increment("ghost").await,
            Err(DomainError::CustomerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn entitlement_outage_propagates() {
        let (storage, manager, id) = setup().await;
        storage.set_entitlements_unavailable(true);

        assert!(matches!(
            manager.check_and_reset(&id).await,
            Err(DomainError::ResolutionFailure(_))
        ));
        assert!(matches!(
            manager.increment(&id).await,
            Err(DomainError::ResolutionFailure(_))
        ));
        assert_eq!(storage.load_usage(&id).await.unwrap().usage_count, 0);
    }

    #[tokio::test]
    async fn concurrent_increments_are_all_counted() {
        let (storage, manager, id) = setup().await;
        let manager = Arc::new(manager);

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let manager = manager.clone();
                let id = id.clone();
                tokio::spawn(async move { manager.increment(&id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(storage.load_usage(&id).await.unwrap().usage_count, 50);
    }

    #[tokio::test]
    async fn concurrent_resets_apply_once() {
        let (storage, manager, id) = setup().await;
        let manager = Arc::new(manager);
        let now = Utc::now();
        seed(&storage, &id, 9, now - Duration::days(10));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                let id = id.clone();
                tokio::spawn(async move { manager.check_and_reset_at(&id, now).await })
            })
            .collect();

        let mut resets = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(decision) => {
                    assert_eq!(decision.count, 0);
                    if decision.reset_occurred {
                        resets += 1;
                    }
                }
                Err(DomainError::ConcurrencyConflict(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(resets, 1);
        assert_eq!(storage.load_usage(&id).await.unwrap().usage_count, 0);
    }

    /// Usage store whose reset write never lands
    struct FailingResetStore {
        inner: Arc<InMemoryStorage>,
    }

    #[async_trait::async_trait]
    impl UsageRepository for FailingResetStore {
        async fn load_usage(&self, customer_id: &str) -> DomainResult<UsageSnapshot> {
            self.inner.load_usage(customer_id).await
        }

        async fn reset_usage_if_unchanged(
            &self,
            _customer_id: &str,
            _observed: DateTime<Utc>,
            _now: DateTime<Utc>,
        ) -> DomainResult<()> {
            Err(DomainError::Storage("disk I/O error".into()))
        }

        async fn increment_usage(&self, customer_id: &str) -> DomainResult<()> {
            self.inner.increment_usage(customer_id).await
        }

        async fn increment_usage_below(&self, customer_id: &str, limit: u32) -> DomainResult<bool> {
            self.inner.increment_usage_below(customer_id, limit).await
        }
    }

    impl RepositoryProvider for FailingResetStore {
        fn customers(&self) -> &dyn CustomerRepository {
            self.inner.as_ref()
        }
        fn usage(&self) -> &dyn UsageRepository {
            self
        }
        fn entitlements(&self) -> &dyn crate::domain::EntitlementRepository {
            self.inner.as_ref()
        }
    }

    #[tokio::test]
    async fn failed_reset_write_is_not_reported_as_reset() {
        let (storage, _, id) = setup().await;
        let stale = Utc::now() - Duration::days(9);
        seed(&storage, &id, 10, stale);

        let repos: Arc<dyn RepositoryProvider> = Arc::new(FailingResetStore {
            inner: storage.clone(),
        });
        let resolver = Arc::new(EntitlementResolver::new(repos.clone(), "insights"));
        let manager = QuotaManager::new(repos, resolver, QuotaPolicy::default());

        match manager.check_and_reset(&id).await {
            Err(DomainError::Storage(_)) => {}
            other => panic!("expected Storage error, got {:?}", other),
        }

        let usage = storage.load_usage(&id).await.unwrap();
        assert_eq!(usage.usage_count, 10);
        assert_eq!(usage.usage_reset_date, stale);
    }

    #[tokio::test]
    async fn write_time_limit_check_blocks_stale_callers() {
        let (storage, manager, id) = setup().await;
        seed(&storage, &id, 9, Utc::now());

        let decision = manager.increment_within_limit(&id).await.unwrap();
        assert_eq!(decision.count, 10);
        assert!(!decision.allowed());

        match manager.increment_within_limit(&id).await {
            Err(DomainError::QuotaExceeded { count, limit }) => {
                assert_eq!((count, limit), (10, 10));
            }
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }
        assert_eq!(storage.load_usage(&id).await.unwrap().usage_count, 10);
    }
}
