//! Retry logic.
//!
//! # Responsibilities
//! - Re-run a failed operation up to `max_attempts` times in total
//! - Wait an exponential backoff with jitter between attempts
//! - Hand back the last error once attempts are exhausted
//!
//! # Design Decisions
//! - A rejection by an open circuit is never retried
//! - A zero base delay retries immediately
//! - Retries are counted per policy instance in metrics

use futures_util::future::BoxFuture;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;
use crate::resilience::policy::{Operation, PolicyError, ResiliencePolicy};

/// Bounded retry with backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    name: String,
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(name: impl Into<String>, config: &RetryConfig) -> Self {
        Self {
            name: name.into(),
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::from(config),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `attempt` until it succeeds, is rejected by a circuit, or attempts run out.
    pub async fn run<F>(&self, mut attempt: F) -> Result<String, PolicyError>
    where
        F: FnMut() -> Result<String, PolicyError>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match attempt() {
                Ok(value) => {
                    if attempts > 1 {
                        tracing::info!(policy = %self.name, attempts, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_circuit_open() => return Err(e),
                Err(e) if attempts >= self.max_attempts => {
                    tracing::warn!(policy = %self.name, attempts, error = %e, "Retries exhausted");
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.backoff.delay(attempts);
                    tracing::info!(
                        policy = %self.name,
                        attempt = attempts,
                        delay = ?delay,
                        error = %e,
                        "Retrying call"
                    );
                    metrics::record_retry(&self.name);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}

impl ResiliencePolicy for RetryPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute<'a>(&'a self, mut operation: Operation<'a>) -> BoxFuture<'a, Result<String, PolicyError>> {
        Box::pin(async move { self.run(|| operation().map_err(PolicyError::from)).await })
    }
}
