//! Retry boundary for external calls.
//!
//! | Failure | Retried |
//! |---------|---------|
//! | `InfrastructureError` | yes, up to `max_attempts` |
//! | `TransportError` | yes, up to `max_attempts` |
//! | attempt timeout | yes, reported as `InfrastructureKind::Timeout` |
//! | `BusinessError` | never |
//! | cancellation | never |

use std::future::Future;

use spa_types::{GatewayError, InfrastructureError};
use tracing::{debug, warn};

use crate::domain::RetryPolicy;

/// Runs `operation` under `policy`.
///
/// Returns the first success, the first non-retryable error, or the last
/// error once attempts are exhausted.
pub async fn execute_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    name: &str,
    mut operation: F,
) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = match tokio::time::timeout(policy.attempt_timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(InfrastructureError::timeout(format!(
                "{name} exceeded {} ms",
                policy.attempt_timeout.as_millis()
            ))
            .into()),
        };

        let error = match result {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !error.is_retryable() {
            return Err(error);
        }

        if attempt >= max_attempts {
            warn!(operation = name, attempts = attempt, error = %error, "Retries exhausted");
            return Err(error);
        }

        warn!(operation = name, attempt, max_attempts, error = %error, "Attempt failed, retrying");
        if !policy.backoff.is_zero() {
            tokio::time::sleep(policy.backoff).await;
        }
        attempt += 1;
    }
}
