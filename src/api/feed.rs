use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::api::state::AppState;
use crate::realtime::Broadcaster;

/// GET /ws - live feed events and viewer count
pub async fn feed_socket(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let broadcaster = state.broadcaster.clone();
    ws.on_upgrade(move |socket| serve_viewer(socket, broadcaster))
}

async fn serve_viewer(socket: WebSocket, broadcaster: Arc<Broadcaster>) {
    // Subscribe first so this viewer sees the count that includes itself
    let mut events = broadcaster.subscribe();
    let viewers = broadcaster.connect();
    tracing::debug!(viewers, "viewer connected");

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!("failed to encode feed event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "viewer lagged, dropping events");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Viewers only listen
                Some(Ok(_)) => {}
            },
        }
    }

    let viewers = broadcaster.disconnect();
    tracing::debug!(viewers, "viewer disconnected");
}
