//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Handler → PolicyRegistry::policy(name) → ResiliencePolicy::execute(op)
//!     PolicyStack:
//!         retries.rs (re-run on failure, backoff.rs between attempts)
//!         → circuit_breaker.rs (reject when open, record every outcome)
//!         → op()
//!     → Err(PolicyError) turned into fallback text by the handler
//! ```
//!
//! # Design Decisions
//! - Policies are explicit values injected into handlers, not wrappers hidden in the service
//! - One breaker per named instance, shared across requests
//! - Retries wrap the breaker, so each attempt is counted and an open circuit stops retrying
//! - Request deadlines are enforced by the HTTP timeout layer

pub mod backoff;
pub mod circuit_breaker;
pub mod policy;
pub mod registry;
pub mod retries;
pub mod stack;

pub use circuit_breaker::{CircuitBreaker, CircuitSnapshot, CircuitState, Permit};
pub use policy::{Operation, Passthrough, PolicyError, ResiliencePolicy};
pub use registry::PolicyRegistry;
pub use retries::RetryPolicy;
pub use stack::PolicyStack;
