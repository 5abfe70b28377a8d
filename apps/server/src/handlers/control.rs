use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub ok: bool,
    pub message: String,
}

pub async fn post_start(State(state): State<AppState>) -> Json<ControlResponse> {
    state.controller.start().await;
    Json(ControlResponse { ok: true, message: "worker fleet started".to_string() })
}

pub async fn post_stop(State(state): State<AppState>) -> Json<ControlResponse> {
    state.controller.stop().await;
    Json(ControlResponse { ok: true, message: "worker fleet stopped".to_string() })
}

pub async fn post_reset(State(state): State<AppState>) -> Json<ControlResponse> {
    state.controller.metrics().reset();
    Json(ControlResponse { ok: true, message: "metrics reset".to_string() })
}
