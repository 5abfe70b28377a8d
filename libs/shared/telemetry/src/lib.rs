//! Structured logging bootstrap shared by every pgload binary.
//!
//! Development builds get a compact, human-readable formatter; release
//! builds emit flattened JSON suitable for ingestion by a log pipeline.
//! Both modes honor `RUST_LOG` and otherwise default to `info` for the
//! named service and `warn` for the HTTP/network crates underneath it.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber for `service_name`.
///
/// Panics if a global subscriber is already installed — this should be
/// called exactly once, near the top of `main`.
pub fn init(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
        format!("{service_name}={default_level},tower_http=warn,hyper=warn").into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }
}
