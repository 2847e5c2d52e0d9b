//! Usage quota handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use tracing::info;

use super::dto::{QuotaStatusResponse, UsageIncrementResponse};
use crate::application::QuotaManager;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse};
use crate::interfaces::http::middleware::AuthenticatedCustomer;

#[derive(Clone)]
pub struct UsageHandlerState {
    pub quota: Arc<QuotaManager>,
}

/// Check the caller's quota, rolling the period over when it has expired
#[utoipa::path(
    get,
    path = "/api/v1/usage",
    tag = "Usage",
    responses(
        (status = 200, description = "Quota status", body = ApiResponse<QuotaStatusResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 503, description = "Entitlement lookup failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_usage(
    State(state): State<UsageHandlerState>,
    Extension(caller): Extension<AuthenticatedCustomer>,
) -> Result<Json<ApiResponse<QuotaStatusResponse>>, ApiError> {
    let decision = state
        .quota
        .check_and_reset(&caller.customer_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(decision.into())))
}

/// Record one metered action for the caller
#[utoipa::path(
    post,
    path = "/api/v1/usage/increment",
    tag = "Usage",
    responses(
        (status = 200, description = "Usage recorded", body = ApiResponse<UsageIncrementResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Customer not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn increment_usage(
    State(state): State<UsageHandlerState>,
    Extension(caller): Extension<AuthenticatedCustomer>,
) -> Result<Json<ApiResponse<UsageIncrementResponse>>, ApiError> {
    state
        .quota
        .increment(&caller.customer_id)
        .await
        .map_err(domain_error)?;

    let usage = state
        .quota
        .peek(&caller.customer_id)
        .await
        .map_err(domain_error)?;

    info!(customer_id = %caller.customer_id, count = usage.count, "Usage recorded");

    Ok(Json(ApiResponse::success(UsageIncrementResponse {
        recorded: true,
        usage: usage.into(),
    })))
}
