//! Read-only admin API.
//!
//! # Endpoints
//! - `GET /health`: version and configured policy instances
//! - `GET /admin/circuit-breakers`: state and counters of every breaker
//!
//! # Design Decisions
//! - Served on the main listener; disabled with `admin.enabled = false`
//!   (`/health` stays available)

pub mod handlers;

use axum::{routing::get, Router};

use crate::http::server::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/circuit-breakers", get(handlers::get_circuit_breakers))
}
