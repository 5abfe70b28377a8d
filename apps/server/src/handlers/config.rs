use axum::extract::State;
use axum::Json;
use pgload_engine::Configuration;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfigRequest {
    pub connections: u32,
    pub read_qps: f64,
    pub write_qps: f64,
    pub churn_rate: f64,
    /// Absent means "keep the currently installed scenario identity".
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub custom_table: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub ok: bool,
    pub config: Configuration,
}

pub async fn post_config(State(state): State<AppState>, Json(request): Json<ConfigRequest>) -> Json<ConfigResponse> {
    let current = state.controller.get_config();
    let (scenario, custom_table) = match request.scenario {
        Some(scenario) => (scenario, request.custom_table),
        None => (current.scenario, current.custom_table),
    };

    let desired = state.settings.clamp(Configuration {
        connections: request.connections,
        read_qps: request.read_qps,
        write_qps: request.write_qps,
        churn_rate: request.churn_rate,
        scenario,
        custom_table,
    });

    let applied = state.controller.update_config(desired).await;
    Json(ConfigResponse { ok: true, config: applied })
}
