//! `/ws` live alert channel.

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures_util::SinkExt;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::core::http::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(25);

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

// GET /ws?apiKey=...
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(q): Query<WsQuery>,
) -> impl IntoResponse {
    let authorized = match &state.ws_api_key {
        Some(expected) => q.api_key.as_deref() == Some(expected.as_str()),
        None => true,
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, authorized))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, authorized: bool) {
    if !authorized {
        warn!("WS client rejected: invalid API key");
        let error = serde_json::json!({ "type": "error", "message": "Unauthorized" });
        let _ = socket.send(Message::Text(error.to_string().into())).await;
        let _ = socket.close().await;
        return;
    }

    let broadcaster = state.runtime.context().broadcaster.clone();
    // Subscribe before sending the snapshot so no update falls in between.
    let mut updates = broadcaster.subscribe();
    state.metrics.websocket_clients.inc();
    info!(clients = broadcaster.client_count(), "WS client connected");

    let welcome = serde_json::json!({
        "type": "connection",
        "message": "Connected to alert updates",
        "timestamp": Utc::now(),
    });
    let initial = match broadcaster.latest().await {
        Some(latest) => Some(latest),
        None => serde_json::to_string(&state.runtime.snapshot().await).ok(),
    };

    let mut open = socket
        .send(Message::Text(welcome.to_string().into()))
        .await
        .is_ok();
    if let (true, Some(initial)) = (open, initial) {
        open = socket.send(Message::Text(initial.into())).await.is_ok();
    }

    let mut ping = interval(PING_INTERVAL);
    ping.tick().await;

    while open {
        tokio::select! {
            _ = ping.tick() => {
                if socket.send(Message::Ping(Bytes::from_static(b"ping"))).await.is_err() {
                    break;
                }
            }

            update = updates.recv() => {
                match update {
                    Ok(payload) => {
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "WS client lagging, skipped updates");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            client_msg = socket.recv() => {
                match client_msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    let _ = socket.close().await;
    state.metrics.websocket_clients.dec();
    info!("WS client disconnected");
}
