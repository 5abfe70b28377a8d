use axum::extract::State;
use axum::Json;
use pgload_workload::ScenarioDescription;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScenariosResponse {
    pub scenarios: Vec<ScenarioDescription>,
}

pub async fn get_scenarios(State(state): State<AppState>) -> Json<ScenariosResponse> {
    Json(ScenariosResponse { scenarios: state.controller.describe_scenarios() })
}
