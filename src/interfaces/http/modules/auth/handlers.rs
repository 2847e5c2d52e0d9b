//! Authentication API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{AuthResponse, LoginRequest, RegisterRequest, UserInfoResponse};
use crate::application::IdentityService;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedCustomer;

#[derive(Clone)]
pub struct AuthHandlerState {
    pub identity: Arc<IdentityService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let name = request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let result = state
        .identity
        .register(&request.email, &request.password, name)
        .await
        .map_err(domain_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(result.into())),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let result = state
        .identity
        .login(&request.email, &request.password)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current customer", body = ApiResponse<UserInfoResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedCustomer>,
) -> Result<Json<ApiResponse<UserInfoResponse>>, ApiError> {
    let info = state
        .identity
        .get_user_info(&caller.customer_id, &caller.customer_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(info.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/users/{user_id}",
    tag = "Authentication",
    params(("user_id" = String, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer profile", body = ApiResponse<UserInfoResponse>),
        (status = 403, description = "Another customer's profile"),
        (status = 404, description = "Customer not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AuthHandlerState>,
    Extension(caller): Extension<AuthenticatedCustomer>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserInfoResponse>>, ApiError> {
    let info = state
        .identity
        .get_user_info(&caller.customer_id, &user_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(info.into())))
}
