use std::sync::Arc;

use clap::Parser;
use pgload_engine::LoadController;
use pgload_metrics::MetricCollector;
use pgload_server::{services::snapshot_broadcaster, AppState, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pgload_telemetry::init("pgload_server");

    let settings = Arc::new(Settings::parse());
    info!(port = settings.http_port, "starting pgload server");

    let metrics = Arc::new(MetricCollector::new());
    let controller = Arc::new(LoadController::new(
        settings.database_url.clone(),
        metrics,
        settings.initial_configuration(),
    ));

    let state = AppState::new(controller, settings.clone());
    snapshot_broadcaster::spawn(state.clone());

    let router = pgload_server::build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.http_port)).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router).await?;
    Ok(())
}
