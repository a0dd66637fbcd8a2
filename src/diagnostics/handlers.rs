use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::lifecycle::startup::{Phase, StartupState, StartupStatus};

#[derive(Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub phase: Phase,
}

pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "status": "alive",
    }))
}

pub async fn get_ready(State(state): State<Arc<StartupState>>) -> (StatusCode, Json<Readiness>) {
    let snapshot = state.snapshot();
    let ready = snapshot.phase == Phase::Ready;
    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        code,
        Json(Readiness {
            ready,
            phase: snapshot.phase,
        }),
    )
}

pub async fn get_startup(State(state): State<Arc<StartupState>>) -> Json<StartupStatus> {
    Json(StartupStatus::clone(&state.snapshot()))
}
