//! The policy seam between HTTP handlers and the protected call.

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::service::ServiceError;

/// Why a protected call did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The operation itself failed (after any retries).
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The circuit breaker rejected the call without running it.
    #[error("CircuitBreaker '{name}' is OPEN and does not permit further calls")]
    CircuitOpen { name: String },
}

impl PolicyError {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, PolicyError::CircuitOpen { .. })
    }
}

/// The protected unit of work. May be invoked more than once.
pub type Operation<'a> = Box<dyn FnMut() -> Result<String, ServiceError> + Send + 'a>;

/// Capability: execute an operation under some resilience behaviour.
pub trait ResiliencePolicy: Send + Sync {
    /// Instance name used in logs and metrics.
    fn name(&self) -> &str;

    fn execute<'a>(&'a self, operation: Operation<'a>) -> BoxFuture<'a, Result<String, PolicyError>>;
}

/// Runs the operation once with no protection.
#[derive(Debug, Clone, Default)]
pub struct Passthrough;

impl ResiliencePolicy for Passthrough {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn execute<'a>(&'a self, mut operation: Operation<'a>) -> BoxFuture<'a, Result<String, PolicyError>> {
        Box::pin(async move { operation().map_err(PolicyError::from) })
    }
}
