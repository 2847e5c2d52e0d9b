//! Authentication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::{AuthResult, CustomerInfo};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,
    /// Shop name
    #[validate(length(max = 255, message = "name must be at most 255 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub is_premium: bool,
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

impl From<AuthResult> for AuthResponse {
    fn from(r: AuthResult) -> Self {
        Self {
            user_id: r.customer.id,
            email: r.customer.email,
            name: r.customer.shop_name,
            is_premium: r.is_premium,
            access_token: r.token,
            token_type: r.token_type,
            expires_in: r.expires_in,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfoResponse {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub is_premium: bool,
    /// Metered analyses used in the current period
    pub analyses_this_week: u32,
    /// `null` when unlimited
    pub analyses_limit: Option<u32>,
    pub analyses_remaining: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<CustomerInfo> for UserInfoResponse {
    fn from(info: CustomerInfo) -> Self {
        Self {
            user_id: info.customer.id,
            email: info.customer.email,
            name: info.customer.shop_name,
            is_premium: info.is_premium,
            analyses_this_week: info.usage.count,
            analyses_limit: info.usage.limit.value(),
            analyses_remaining: info.usage.remaining(),
            created_at: info.customer.signup_date,
            last_login: info.customer.last_login,
        }
    }
}
