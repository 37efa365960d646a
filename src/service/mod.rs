//! Simulated external dependency.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → ExternalService (trait object in AppState)
//!         call()                   probabilistic, stateless
//!         call_external_api_sync() parity-alternating counter
//!         async_process()          spawned task, boxed future
//!         process_with_callback()  spawned task, completion handler
//!     → fallback.rs formats user-facing text from errors
//! ```
//!
//! # Design Decisions
//! - The trait is object safe so handlers can be tested against doubles
//! - Retry and circuit breaking are NOT applied here; the HTTP layer wraps
//!   calls with a named `ResiliencePolicy`
//! - The invocation counter belongs to the service instance, not a global

pub mod callback;
pub mod fallback;
pub mod outcome;
pub mod simulated;

use std::fmt::Display;
use futures_util::future::BoxFuture;

pub use callback::{Callback, CallbackTask, CALLBACK_INTERRUPTED, CALLBACK_SUCCESS};
pub use outcome::{CallOutcome, ServiceError, EXTERNAL_FAILURE, EXTERNAL_SUCCESS};
pub use simulated::{SimulatedExternalService, ASYNC_FAILURE, ASYNC_SUCCESS};

/// Contract of the external dependency exposed over HTTP.
pub trait ExternalService: Send + Sync {
    /// Unreliable call: fails with a fixed probability.
    fn call(&self) -> Result<String, ServiceError>;

    /// Deterministic call alternating failure/success by invocation parity.
    fn call_external_api_sync(&self) -> Result<String, ServiceError>;

    /// Substitute text returned once the protected sync call gives up.
    fn fallback(&self, error: &dyn Display) -> String {
        fallback::fallback_response(error)
    }

    /// Run work in the background and hand the final message to `callback`
    /// exactly once.
    fn process_with_callback(&self, callback: Callback) -> CallbackTask;

    /// Start work in the background and return a future of its result.
    fn async_process(&self) -> BoxFuture<'static, Result<String, ServiceError>>;

    fn on_success(&self, result: &str) -> String {
        fallback::success_handler(result)
    }

    fn on_error(&self, error: &dyn Display) -> String {
        fallback::error_handler(error)
    }
}
