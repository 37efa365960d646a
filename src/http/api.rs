//! `/api/*` handlers.
//!
//! | Path           | Style     | Protection                      |
//! |----------------|-----------|---------------------------------|
//! | `/api/test`    | sync      | none, failure → 500             |
//! | `/api/call`    | sync      | `endpoints.call` policy         |
//! | `/api/callSync`| sync      | `endpoints.call_sync` policy    |
//! | `/api/callAsync`| future   | `on_success` / `on_error`       |
//! | `/api/callback`| callback  | bridged through a oneshot       |

use axum::extract::State;
use std::time::Instant;
use tokio::sync::oneshot;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::service::{fallback, CALLBACK_INTERRUPTED, CALLBACK_SUCCESS};

/// Probabilistic call without protection.
pub async fn test_api(State(state): State<AppState>) -> Result<String, ApiError> {
    let start = Instant::now();
    match state.service.call() {
        Ok(message) => {
            metrics::record_request("test", "success", start);
            Ok(message)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unprotected call failed");
            metrics::record_request("test", "error", start);
            Err(e.into())
        }
    }
}

/// Probabilistic call behind the circuit breaker.
pub async fn call_external(State(state): State<AppState>) -> String {
    let start = Instant::now();
    let result = state
        .call_policy
        .execute(Box::new(|| state.service.call()))
        .await;

    match result {
        Ok(message) => {
            metrics::record_request("call", "success", start);
            message
        }
        Err(e) => {
            tracing::info!(policy = state.call_policy.name(), error = %e, "Serving fallback");
            metrics::record_fallback("call");
            metrics::record_request("call", "fallback", start);
            fallback::unavailable_response(&e)
        }
    }
}

/// Parity-alternating call behind retry and circuit breaker.
pub async fn call_sync(State(state): State<AppState>) -> String {
    let start = Instant::now();
    let result = state
        .sync_policy
        .execute(Box::new(|| state.service.call_external_api_sync()))
        .await;

    match result {
        Ok(message) => {
            metrics::record_request("callSync", "success", start);
            message
        }
        Err(e) => {
            tracing::info!(policy = state.sync_policy.name(), error = %e, "Serving fallback");
            metrics::record_fallback("callSync");
            metrics::record_request("callSync", "fallback", start);
            state.service.fallback(&e)
        }
    }
}

/// Future-based call; exactly one of the success/error handlers applies.
pub async fn call_async(State(state): State<AppState>) -> String {
    let start = Instant::now();
    match state.service.async_process().await {
        Ok(result) => {
            metrics::record_request("callAsync", "success", start);
            state.service.on_success(&result)
        }
        Err(e) => {
            metrics::record_request("callAsync", "error", start);
            state.service.on_error(&e)
        }
    }
}

/// Callback-based call bridged to the HTTP response.
pub async fn callback(State(state): State<AppState>) -> String {
    let start = Instant::now();
    let (tx, rx) = oneshot::channel();

    let _task = state.service.process_with_callback(Box::new(move |message| {
        let _ = tx.send(message);
    }));

    let message = rx.await.unwrap_or_else(|_| {
        tracing::warn!("Callback dropped without a result");
        CALLBACK_INTERRUPTED.to_string()
    });
    let outcome = if message == CALLBACK_SUCCESS { "success" } else { "interrupted" };
    metrics::record_request("callback", outcome, start);
    message
}
