//! HTTP and WebSocket front end: translates the configuration surface
//! and control API into calls against [`pgload_engine::LoadController`]
//! and streams its metric snapshots out over a WebSocket.
//!
//! This crate knows nothing about workers, scenarios, or the database
//! boundary — it only adapts HTTP/JSON/WebSocket framing onto the core
//! engine's API.

pub mod config;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;

pub use config::Settings;
pub use state::AppState;

use axum::Router;

pub fn build_router(state: AppState) -> Router {
    routes::router(state)
}
