//! Admin handlers: circuit visibility and operational recovery.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::resilience::CircuitStatus;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct CircuitReport {
    pub cache: CircuitStatus,
    pub rate_limit: CircuitStatus,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_circuits(State(state): State<AppState>) -> Json<CircuitReport> {
    Json(CircuitReport {
        cache: state.cache.circuit_status(),
        rate_limit: state.limiter.circuit_status(),
    })
}

pub async fn reset_circuits(State(state): State<AppState>) -> Json<CircuitReport> {
    state.cache.reset_circuit();
    state.limiter.reset_circuit();
    tracing::info!("Circuit breakers reset via admin endpoint");

    Json(CircuitReport {
        cache: state.cache.circuit_status(),
        rate_limit: state.limiter.circuit_status(),
    })
}
