use chrono::{DateTime, Utc};

/// Customer account
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: String,
    /// Always stored lower-cased
    pub email: String,
    pub password_hash: String,
    pub shop_name: Option<String>,
    pub access_key: String,
    pub data_consent: bool,
    pub consent_updated_at: Option<DateTime<Utc>>,
    pub signup_date: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    /// Metered operations consumed in the current period
    pub usage_count: u32,
    /// Start of the current counting period
    pub usage_reset_date: DateTime<Utc>,
    /// Legacy column; premium status is resolved through entitlements.
    pub is_premium: bool,
    pub is_email_verified: bool,
}

impl Customer {
    pub fn usage(&self) -> UsageSnapshot {
        UsageSnapshot {
            usage_count: self.usage_count,
            usage_reset_date: self.usage_reset_date,
        }
    }
}

/// Data required to create a customer
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub password_hash: String,
    pub shop_name: Option<String>,
    pub access_key: String,
}

/// Usage counter state read in a single load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub usage_count: u32,
    pub usage_reset_date: DateTime<Utc>,
}
