//! WebSocket upgrade handling and the per-namespace dispatch tables
//! (spec.md §4.5). Grounded on the teacher's `handle_websocket.rs`: split
//! the socket into sink/stream, forward outbound frames from an mpsc
//! channel in a dedicated task, and drive the read loop off the stream.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::hub::{NAMESPACE_ALERTS, NAMESPACE_CHAT, NAMESPACE_DASHBOARD, NAMESPACE_WIDGETS};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws/alerts", get(upgrade_alerts))
        .route("/ws/chat", get(upgrade_chat))
        .route("/ws/widgets", get(upgrade_widgets))
        .route("/ws/dashboard", get(upgrade_dashboard))
}

async fn upgrade_alerts(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, NAMESPACE_ALERTS))
}

async fn upgrade_chat(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, NAMESPACE_CHAT))
}

async fn upgrade_widgets(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, NAMESPACE_WIDGETS))
}

async fn upgrade_dashboard(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, NAMESPACE_DASHBOARD))
}

async fn handle_socket(socket: WebSocket, state: AppState, namespace: &'static str) {
    let (mut sink, mut stream) = socket.split();
    let (socket_id, mut outbound_rx) = state.hub.connect(namespace, "StreamForge").await;

    let forward = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let text = frame.to_string();
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                if let Ok(frame) = serde_json::from_str::<Value>(&text) {
                    dispatch(&state, namespace, &frame).await;
                }
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => {}
        }
    }

    forward.abort();
    state.hub.disconnect(namespace, socket_id, "stream ended").await;
}

/// Per-namespace dispatch table (spec.md §4.5). Unknown events are dropped
/// silently rather than erroring.
async fn dispatch(state: &AppState, namespace: &str, frame: &Value) {
    let Some(event) = frame.get("event").and_then(Value::as_str) else {
        return;
    };
    let payload = frame.get("payload").cloned().unwrap_or(Value::Null);

    match (namespace, event) {
        (NAMESPACE_ALERTS, "alert:done") => {
            let instance_id = payload
                .get("alertId")
                .and_then(Value::as_str)
                .and_then(|s| uuid::Uuid::parse_str(s).ok());
            state.queue.complete(instance_id).await;
        }
        (NAMESPACE_ALERTS, "alert:skip") => {
            info!(?payload, "alert:skip received, no state change");
        }
        (NAMESPACE_ALERTS, "alert:pause") => {
            state.hub.broadcast(NAMESPACE_ALERTS, "alert:paused", payload).await;
        }
        (NAMESPACE_CHAT, "chat:clear") => {
            state.hub.broadcast(NAMESPACE_CHAT, "chat:clear", Value::Null).await;
        }
        (NAMESPACE_CHAT, "chat:delete") => {
            state.hub.broadcast(NAMESPACE_CHAT, "chat:delete", payload).await;
        }
        (NAMESPACE_WIDGETS, "config:changed") => {
            state
                .hub
                .broadcast(NAMESPACE_WIDGETS, "config:changed", payload)
                .await;
        }
        (NAMESPACE_DASHBOARD, "config:changed") => {
            // Relay only — no echo back onto /dashboard (invariant 15).
            state
                .hub
                .broadcast(NAMESPACE_WIDGETS, "config:changed", payload)
                .await;
        }
        (NAMESPACE_DASHBOARD, "alert:trigger") => {
            state.hub.broadcast(NAMESPACE_ALERTS, "alert:trigger", payload).await;
        }
        _ => {
            warn!(namespace, event, "unhandled event dropped");
        }
    }
}
