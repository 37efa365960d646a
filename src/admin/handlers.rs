use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::resilience::CircuitSnapshot;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub policies: Vec<String>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        policies: state.policies.names().map(str::to_string).collect(),
    })
}

pub async fn get_circuit_breakers(State(state): State<AppState>) -> Json<Vec<CircuitSnapshot>> {
    Json(state.policies.snapshots())
}
