//! Quota policy and decision types

use chrono::{DateTime, Utc};

/// Free-tier quota configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Metered operations allowed per period for customers without the
    /// unlimited entitlement.
    pub free_tier_limit: u32,
    /// Length of the counting period in whole days.
    pub reset_period_days: i64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            free_tier_limit: 10,
            reset_period_days: 7,
        }
    }
}

/// Where a customer stands relative to its counting period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodState {
    WithinPeriod,
    PeriodExpired,
}

impl QuotaPolicy {
    /// Whole days elapsed since `reset_date`. Negative when the reset date is
    /// in the future (clock skew between writers).
    pub fn elapsed_days(reset_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        (now - reset_date).num_days()
    }

    pub fn period_state(&self, reset_date: DateTime<Utc>, now: DateTime<Utc>) -> PeriodState {
        if Self::elapsed_days(reset_date, now) >= self.reset_period_days {
            PeriodState::PeriodExpired
        } else {
            PeriodState::WithinPeriod
        }
    }

    /// When the current period lapses, for display purposes.
    pub fn next_reset(&self, reset_date: DateTime<Utc>) -> DateTime<Utc> {
        reset_date + chrono::Duration::days(self.reset_period_days)
    }
}

/// Upper bound applied to a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaLimit {
    Limited(u32),
    Unbounded,
}

impl QuotaLimit {
    /// `None` for unbounded
    pub fn value(&self) -> Option<u32> {
        match self {
            QuotaLimit::Limited(n) => Some(*n),
            QuotaLimit::Unbounded => None,
        }
    }
}

/// Result of a quota check. Valid only for the instant it was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub count: u32,
    pub limit: QuotaLimit,
    pub reset_occurred: bool,
}

impl QuotaDecision {
    pub fn allowed(&self) -> bool {
        match self.limit {
            QuotaLimit::Unbounded => true,
            QuotaLimit::Limited(limit) => self.count < limit,
        }
    }

    /// Operations left in this period; `None` when unbounded.
    pub fn remaining(&self) -> Option<u32> {
        self.limit.value().map(|limit| limit.saturating_sub(self.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn default_policy() {
        let policy = QuotaPolicy::default();
        assert_eq!(policy.free_tier_limit, 10);
        assert_eq!(policy.reset_period_days, 7);
    }

    #[test]
    fn period_boundary_uses_whole_days() {
        let policy = QuotaPolicy::default();
        let now = Utc::now();

        let almost = now - Duration::days(7) + Duration::seconds(1);
        assert_eq!(policy.period_state(almost, now), PeriodState::WithinPeriod);

        let exactly = now - Duration::days(7);
        assert_eq!(policy.period_state(exactly, now), PeriodState::PeriodExpired);

        let long_ago = now - Duration::days(30);
        assert_eq!(policy.period_state(long_ago, now), PeriodState::PeriodExpired);
    }

    #[test]
    fn future_reset_date_is_within_period() {
        let policy = QuotaPolicy::default();
        let now = Utc::now();
        let future = now + Duration::days(9);
        assert!(QuotaPolicy::elapsed_days(future, now) < 0);
        assert_eq!(policy.period_state(future, now), PeriodState::WithinPeriod);
    }

    #[test]
    fn next_reset_is_one_period_later() {
        let policy = QuotaPolicy {
            free_tier_limit: 3,
            reset_period_days: 2,
        };
        let start = Utc::now();
        assert_eq!(policy.next_reset(start), start + Duration::days(2));
    }

    #[test]
    fn decision_allowed_and_remaining() {
        let under = QuotaDecision {
            count: 9,
            limit: QuotaLimit::Limited(10),
            reset_occurred: false,
        };
        assert!(under.allowed());
        assert_eq!(under.remaining(), Some(1));

        let at = QuotaDecision {
            count: 10,
            limit: QuotaLimit::Limited(10),
            reset_occurred: false,
        };
        assert!(!at.allowed());
        assert_eq!(at.remaining(), Some(0));

        let over = QuotaDecision {
            count: 14,
            limit: QuotaLimit::Limited(10),
            reset_occurred: false,
        };
        assert!(!over.allowed());
        assert_eq!(over.remaining(), Some(0));
    }

    #[test]
    fn unbounded_is_always_allowed() {
        let decision = QuotaDecision {
            count: 10_000,
            limit: QuotaLimit::Unbounded,
            reset_occurred: false,
        };
        assert!(decision.allowed());
        assert_eq!(decision.remaining(), None);
        assert_eq!(decision.limit.value(), None);
    }
}
