//! Identity service: application-layer orchestration
//!
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::application::entitlements::EntitlementResolver;
use crate::application::quota::QuotaManager;
use crate::domain::{Customer, DomainError, DomainResult, NewCustomer, QuotaDecision, RepositoryProvider};
use crate::infrastructure::crypto::{
    create_token, generate_access_key, hash_password, verify_password, JwtConfig,
};

const MIN_PASSWORD_LEN: usize = 8;

/// Returned after a successful registration or login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub customer: Customer,
    pub is_premium: bool,
}

/// Profile view of a customer with its current quota standing
#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub customer: Customer,
    pub is_premium: bool,
    pub usage: QuotaDecision,
}

pub struct IdentityService {
    repos: Arc<dyn RepositoryProvider>,
    entitlements: Arc<EntitlementResolver>,
    quota: Arc<QuotaManager>,
    jwt_config: JwtConfig,
}

impl IdentityService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        entitlements: Arc<EntitlementResolver>,
        quota: Arc<QuotaManager>,
        jwt_config: JwtConfig,
    ) -> Self {
        Self {
            repos,
            entitlements,
            quota,
            jwt_config,
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Registration ────────────────────────────────────────────

    /// Create an account and sign it in. Email is stored lower-cased.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        shop_name: Option<String>,
    ) -> DomainResult<AuthResult> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.repos.customers().find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered".into()));
        }

        let password_hash = hash_password(password)
            .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))?;

        let customer = self
            .repos
            .customers()
            .create(NewCustomer {
                email,
                password_hash,
                shop_name,
                access_key: generate_access_key(),
            })
            .await?;

        info!(customer_id = %customer.id, email = %customer.email, "New customer registered");
        self.issue(customer, false)
    }

    // ── Authentication ──────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let email = email.trim().to_lowercase();
        let Some(customer) = self.repos.customers().find_by_email(&email).await? else {
            return Err(DomainError::Unauthorized("Invalid email or password".into()));
        };

        let valid = verify_password(password, &customer.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid email or password".into()));
        }

        // A failed timestamp update does not fail the login
        if let Err(e) = self
            .repos
            .customers()
            .touch_last_login(&customer.id, Utc::now())
            .await
        {
            warn!(customer_id = %customer.id, error = %e, "Failed to update last_login");
        }

        let is_premium = self.entitlements.has_unlimited_usage(&customer.id).await?;
        info!(customer_id = %customer.id, "Customer logged in");
        self.issue(customer, is_premium)
    }

    fn issue(&self, customer: Customer, is_premium: bool) -> DomainResult<AuthResult> {
        let token = create_token(&customer.id, &customer.email, &self.jwt_config)
            .map_err(|e| DomainError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            customer,
            is_premium,
        })
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Profile of `customer_id` as seen by `requester_id`. Customers may only
    /// read their own profile.
    pub async fn get_user_info(
        &self,
        requester_id: &str,
        customer_id: &str,
    ) -> DomainResult<CustomerInfo> {
        if requester_id != customer_id {
            return Err(DomainError::Forbidden(
                "Not authorized to access this user's data".into(),
            ));
        }

        let customer = self
            .repos
            .customers()
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| DomainError::CustomerNotFound(customer_id.to_string()))?;

        let usage = self.quota.peek(customer_id).await?;
        let is_premium = usage.limit.value().is_none();

        Ok(CustomerInfo {
            customer,
            is_premium,
            usage,
        })
    }
}
