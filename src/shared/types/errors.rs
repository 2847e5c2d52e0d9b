use thiserror::Error;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// The entitlement store could not be reached. Never read as "not entitled".
    #[error("Entitlement lookup failed: {0}")]
    ResolutionFailure(String),

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A conditional update lost against a concurrent writer.
    #[error("Concurrent update detected: {0}")]
    ConcurrencyConflict(String),

    #[error("Usage quota exhausted: {count}/{limit}")]
    QuotaExceeded { count: u32, limit: u32 },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A local failure (hashing, token signing) that a retry will not fix.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error is likely transient and the operation may succeed
    /// if retried by the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::ResolutionFailure(_)
                | DomainError::ConcurrencyConflict(_)
                | DomainError::Storage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(DomainError::ConcurrencyConflict("c1".into()).is_transient());
        assert!(DomainError::ResolutionFailure("down".into()).is_transient());
        assert!(DomainError::Storage("timeout".into()).is_transient());
        assert!(!DomainError::CustomerNotFound("c1".into()).is_transient());
        assert!(!DomainError::invalid_input("sale_price", "negative").is_transient());
        assert!(!DomainError::Internal("bcrypt cost".into()).is_transient());
    }

    #[test]
    fn invalid_input_names_the_field() {
        let err = DomainError::invalid_input("shipping_cost", "must be non-negative");
        assert_eq!(
            err.to_string(),
            "Invalid input for shipping_cost: must be non-negative"
        );
    }
}
