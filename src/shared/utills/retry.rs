//! Retry with exponential backoff
//!
//! Used by callers of the quota manager: a lost compare-and-set or an
//! unreachable entitlement store is surfaced as a transient error, and the
//! whole check-then-act sequence is retried from the top.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::shared::DomainError;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    /// Cap on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(1),
        }
    }
}

/// Execute an async operation with exponential backoff retry.
///
/// `should_retry` decides whether an error is transient (retry) or
/// permanent (bail immediately).
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if attempt >= max_attempts || !should_retry(&err) {
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts,
                        error = %err,
                        "Operation failed permanently"
                    );
                    return Err(err);
                }

                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Transient failure, retrying"
                );

                tokio::time::sleep(delay).await;

                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * config.backoff_multiplier)
                        .min(config.max_delay.as_secs_f64()),
                );
                attempt += 1;
            }
        }
    }
}

/// [`retry_with_backoff`] specialised to [`DomainError::is_transient`].
pub async fn retry_transient<F, Fut, T>(
    config: &RetryConfig,
    operation: F,
    operation_name: &str,
) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    retry_with_backoff(config, operation, DomainError::is_transient, operation_name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn retries_transient_until_success() {
        let calls = &AtomicU32::new(0);
        let result = retry_transient(
            &fast(),
            || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(DomainError::ConcurrencyConflict("c1".into()))
                } else {
                    Ok(7)
                }
            },
            "test",
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry_transient(
            &fast(),
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::CustomerNotFound("c1".into()))
            },
            "test",
        )
        .await;

        assert!(matches!(result, Err(DomainError::CustomerNotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry_transient(
            &fast(),
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::ConcurrencyConflict("c1".into()))
            },
            "test",
        )
        .await;

        assert!(matches!(result, Err(DomainError::ConcurrencyConflict(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn internal_failure_is_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry_transient(
            &fast(),
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::Internal("Failed to hash password".into()))
            },
            "test",
        )
        .await;

        assert!(matches!(result, Err(DomainError::Internal(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
