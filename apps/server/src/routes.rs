//! Router assembly: wires every handler onto its path and layers on
//! the cross-cutting CORS and request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{config, control, scenarios, status, stream};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(status::get_status))
        .route("/config", post(config::post_config))
        .route("/start", post(control::post_start))
        .route("/stop", post(control::post_stop))
        .route("/reset", post(control::post_reset))
        .route("/scenarios", get(scenarios::get_scenarios))
        .route("/stream", get(stream::stream_snapshots))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pgload_engine::{Configuration, LoadController};
    use pgload_metrics::MetricCollector;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Settings;

    fn test_state() -> AppState {
        let metrics = Arc::new(MetricCollector::new());
        let controller = Arc::new(LoadController::new(
            "postgres://localhost/test",
            metrics,
            Configuration::default(),
        ));
        let settings = Arc::new(Settings {
            database_url: "postgres://localhost/test".to_string(),
            http_port: 8080,
            default_connections: 0,
            default_read_qps: 0.0,
            default_write_qps: 0.0,
            default_churn_rate: 0.0,
            default_scenario: "simple".to_string(),
            default_custom_table: None,
            max_connections: 1_000,
            max_read_qps: 100_000.0,
            max_write_qps: 100_000.0,
            snapshot_interval_ms: 1_000,
        });
        AppState::new(controller, settings)
    }

    #[tokio::test]
    async fn status_reports_not_running_before_start() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["running"], false);
    }

    #[tokio::test]
    async fn scenarios_list_ends_with_custom_entry() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/scenarios").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let scenarios = payload["scenarios"].as_array().unwrap();
        assert_eq!(scenarios.last().unwrap()["name"], "custom");
    }

    #[tokio::test]
    async fn post_config_updates_without_starting_fleet() {
        let app = router(test_state());
        let request_body = serde_json::json!({
            "connections": 4,
            "read_qps": 100.0,
            "write_qps": 10.0,
            "churn_rate": 0.0,
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/config")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&request_body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["config"]["connections"], 4);
        assert_eq!(payload["ok"], true);
    }
}
