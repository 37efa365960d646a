//! Retry around circuit breaker around the operation.

use futures_util::future::BoxFuture;
use std::sync::Arc;

use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::policy::{Operation, PolicyError, ResiliencePolicy};
use crate::resilience::retries::RetryPolicy;

/// A named combination of optional retry and optional circuit breaker.
///
/// Every retry attempt goes through the breaker, so retried failures count
/// toward opening the circuit and an open circuit ends the retry loop.
pub struct PolicyStack {
    name: String,
    retry: Option<RetryPolicy>,
    breaker: Option<Arc<CircuitBreaker>>,
}

impl PolicyStack {
    pub fn new(
        name: impl Into<String>,
        retry: Option<RetryPolicy>,
        breaker: Option<Arc<CircuitBreaker>>,
    ) -> Self {
        Self {
            name: name.into(),
            retry,
            breaker,
        }
    }

    pub fn breaker(&self) -> Option<&Arc<CircuitBreaker>> {
        self.breaker.as_ref()
    }

    pub fn retry(&self) -> Option<&RetryPolicy> {
        self.retry.as_ref()
    }
}

impl ResiliencePolicy for PolicyStack {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute<'a>(&'a self, mut operation: Operation<'a>) -> BoxFuture<'a, Result<String, PolicyError>> {
        Box::pin(async move {
            let breaker = self.breaker.as_deref();
            let guarded = move || match breaker {
                Some(cb) => cb.call(&mut operation),
                None => operation().map_err(PolicyError::from),
            };

            match &self.retry {
                Some(retry) => retry.run(guarded).await,
                None => {
                    let mut guarded = guarded;
                    guarded()
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CircuitBreakerConfig, RetryConfig};
    use crate::resilience::circuit_breaker::CircuitState;
    use crate::service::{CallOutcome, ServiceError};

    fn stack(with_retry: bool) -> PolicyStack {
        let retry = with_retry.then(|| {
            RetryPolicy::new(
                "s",
                &RetryConfig {
                    max_attempts: 3,
                    base_delay_ms: 0,
                    max_delay_ms: 0,
                },
            )
        });
        let breaker = Arc::new(CircuitBreaker::new(
            "s",
            CircuitBreakerConfig {
                sliding_window_size: 4,
                minimum_number_of_calls: 4,
                failure_rate_threshold: 50.0,
                wait_duration_open_ms: 60_000,
                permitted_calls_in_half_open: 1,
            },
        ));
        PolicyStack::new("s", retry, Some(breaker))
    }

    #[tokio::test]
    async fn test_retry_hides_odd_attempt() {
        let policy = stack(true);
        let mut counter = 0u64;
        let result = policy
            .execute(Box::new(|| {
                counter += 1;
                CallOutcome::for_attempt(counter).into_result()
            }))
            .await;

        assert_eq!(result.unwrap(), "✅ Success on attempt 2");
        assert_eq!(counter, 2);
        assert_eq!(policy.breaker().unwrap().snapshot().buffered_calls, 2);
    }

    #[tokio::test]
    async fn test_retried_failures_open_circuit() {
        let policy = stack(true);
        let mut calls = 0;
        let first = policy
            .execute(Box::new(|| {
                calls += 1;
                Err(ServiceError::Simulated("down".into()))
            }))
            .await;
        assert_eq!(first.unwrap_err().to_string(), "down");

        // 3 failures buffered; the 4th opens the circuit and the 5th is rejected.
        let second = policy
            .execute(Box::new(|| {
                calls += 1;
                Err(ServiceError::Simulated("down".into()))
            }))
            .await;
        assert!(second.unwrap_err().is_circuit_open());
        assert_eq!(calls, 4);
        assert_eq!(policy.breaker().unwrap().state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_breaker_only_runs_once() {
        let policy = stack(false);
        let mut calls = 0;
        let result = policy
            .execute(Box::new(|| {
                calls += 1;
                Err(ServiceError::Simulated("down".into()))
            }))
            .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
        assert!(policy.retry().is_none());
    }
}
