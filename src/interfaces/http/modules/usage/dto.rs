//! Usage quota DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::QuotaDecision;

/// Caller's position within the current quota period
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuotaStatusResponse {
    pub count: u32,
    /// `null` when unlimited
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub allowed: bool,
    /// The period rolled over during this request
    pub reset_occurred: bool,
    pub unlimited: bool,
}

impl From<QuotaDecision> for QuotaStatusResponse {
    fn from(decision: QuotaDecision) -> Self {
        let limit = decision.limit.value();
        Self {
            count: decision.count,
            limit,
            remaining: decision.remaining(),
            allowed: decision.allowed(),
            reset_occurred: decision.reset_occurred,
            unlimited: limit.is_none(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsageIncrementResponse {
    pub recorded: bool,
    pub usage: QuotaStatusResponse,
}
