//! WebSocket snapshot stream: upgrades the connection, subscribes to
//! the broadcaster, and forwards every snapshot as a JSON text frame
//! until the client disconnects or falls far enough behind to lag the
//! broadcast channel.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, instrument};

use crate::state::AppState;

pub async fn stream_snapshots(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

#[instrument(skip(socket, state))]
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut receiver = state.snapshots.subscribe();

    loop {
        match receiver.recv().await {
            Ok(snapshot) => {
                let payload = match serde_json::to_string(&*snapshot) {
                    Ok(payload) => payload,
                    Err(error) => {
                        debug!(%error, "failed to serialize snapshot");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload)).await.is_err() {
                    return;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "snapshot subscriber lagged, resuming from latest");
                continue;
            }
            Err(RecvError::Closed) => return,
        }
    }
}
