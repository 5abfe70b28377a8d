use axum::extract::State;
use axum::Json;
use pgload_engine::Configuration;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub config: Configuration,
    pub uptime_seconds: f64,
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: state.controller.is_running(),
        config: state.controller.get_config(),
        uptime_seconds: state.controller.uptime().as_secs_f64(),
    })
}
