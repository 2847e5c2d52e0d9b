//! Shared HTTP types: response envelope, error mapping, validated JSON

pub mod validated_json;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::domain::DomainError;

pub use validated_json::ValidatedJson;

/// Standard API response wrapper
///
/// Every REST endpoint returns its payload in this envelope.
/// On success: `{"success": true, "data": {...}}`,
/// on error: `{"success": false, "data": null, "error": "description"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Payload; `null` on error
    pub data: Option<T>,
    /// Error description; omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error half of every handler's `Result`
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::CustomerNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::ResolutionFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::ConcurrencyConflict(_) => StatusCode::CONFLICT,
        DomainError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a domain error onto status + envelope. Storage and internal details
/// stay in the log.
pub fn domain_error(err: DomainError) -> ApiError {
    let status = status_for(&err);
    let message = match &err {
        DomainError::Storage(_) => "Service temporarily unavailable".to_string(),
        DomainError::Internal(_) => "Internal server error".to_string(),
        other => other.to_string(),
    };

    if status.is_server_error() {
        error!(error = %err, status = status.as_u16(), "Request failed");
    } else {
        debug!(error = %err, status = status.as_u16(), "Request rejected");
    }

    (status, Json(ApiResponse::error(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (DomainError::CustomerNotFound("c".into()), 404),
            (DomainError::ResolutionFailure("down".into()), 503),
            (DomainError::invalid_input("sale_price", "negative"), 422),
            (DomainError::ConcurrencyConflict("c".into()), 409),
            (DomainError::QuotaExceeded { count: 10, limit: 10 }, 429),
            (DomainError::Validation("bad".into()), 400),
            (DomainError::Conflict("dup".into()), 409),
            (DomainError::Unauthorized("no".into()), 401),
            (DomainError::Forbidden("no".into()), 403),
            (DomainError::Storage("io".into()), 503),
            (DomainError::Internal("signing".into()), 500),
        ];
        for (err, code) in cases {
            assert_eq!(status_for(&err).as_u16(), code, "{err}");
        }
    }

    #[test]
    fn storage_details_are_hidden() {
        let (status, Json(body)) = domain_error(DomainError::Storage("password=hunter2".into()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.success);
        assert!(!body.error.unwrap().contains("hunter2"));
    }

    #[test]
    fn internal_failures_are_not_reported_as_unavailable() {
        let (status, Json(body)) =
            domain_error(DomainError::Internal("Failed to create token: InvalidKeyFormat".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.as_deref(), Some("Internal server error"));
    }

    #[test]
    fn quota_error_carries_counts() {
        let (_, Json(body)) = domain_error(DomainError::QuotaExceeded { count: 10, limit: 10 });
        assert_eq!(body.error.as_deref(), Some("Usage quota exhausted: 10/10"));
    }
}
