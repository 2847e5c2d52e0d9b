//! Metered fee calculation: quota check, compute, record usage

use std::sync::Arc;

use tracing::info;

use super::FeeCalculator;
use crate::application::quota::QuotaManager;
use crate::domain::{
    DomainError, DomainResult, FeeBreakdown, QuotaDecision, QuotaLimit, SaleInput,
};
use crate::shared::{retry_transient, RetryConfig};

#[derive(Debug, Clone)]
pub struct MeteredFeeResult {
    pub breakdown: FeeBreakdown,
    /// Standing after this operation was recorded
    pub usage: QuotaDecision,
}

pub struct MeteredFeeService {
    quota: Arc<QuotaManager>,
    calculator: Arc<FeeCalculator>,
    retry: RetryConfig,
}

impl MeteredFeeService {
    pub fn new(quota: Arc<QuotaManager>, calculator: Arc<FeeCalculator>) -> Self {
        Self {
            quota,
            calculator,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Run one metered calculation for `customer_id`.
    ///
    /// The whole check-compute-record sequence is retried on transient
    /// failures such as a lost reset race. A blocked customer gets
    /// `QuotaExceeded`; invalid input is rejected without consuming quota.
    pub async fn calculate(
        &self,
        customer_id: &str,
        sale: &SaleInput,
    ) -> DomainResult<MeteredFeeResult> {
        retry_transient(
            &self.retry,
            move || self.attempt(customer_id, sale),
            "metered_fee_calculation",
        )
        .await
    }

    async fn attempt(&self, customer_id: &str, sale: &SaleInput) -> DomainResult<MeteredFeeResult> {
        let decision = self.quota.check_and_reset(customer_id).await?;

        if let QuotaLimit::Limited(limit) = decision.limit {
            if !decision.allowed() {
                info!(customer_id, count = decision.count, limit, "Metered call blocked");
                return Err(DomainError::QuotaExceeded {
                    count: decision.count,
                    limit,
                });
            }
        }

        let breakdown = self.calculator.calculate(sale)?;

        // The check above may be stale by now; the write re-checks the limit.
        let recorded = self.quota.increment_within_limit(customer_id).await?;
        let usage = QuotaDecision {
            reset_occurred: decision.reset_occurred,
            ..recorded
        };

        Ok(MeteredFeeResult { breakdown, usage })
    }
}
