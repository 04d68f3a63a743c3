//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection: client
//! commands and live-view signals are processed one at a time by this task.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::LiveViews;
use crate::app_state::AppState;
use crate::domain::AdminSession;
use crate::storage::BlobStore;
use crate::store::AdminStore;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and runs them against its live views.
/// - Pushes whatever the live views produce to the client.
///
/// Returning drops every subscription and timer of the connection.
pub async fn run_connection<S: AdminStore, B: BlobStore>(
    socket: WebSocket,
    state: AppState<S, B>,
    admin: AdminSession,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut views = LiveViews::new(state, admin.id);
    tracing::debug!(admin_id = %admin.id, "ws connection opened");

    loop {
        let outgoing = tokio::select! {
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => handle_text_message(&text, &mut views).await,
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => Vec::new(),
            },
            signal = views.next_signal() => views.handle_signal(signal).await,
        };
        for msg in outgoing {
            if ws_tx.send(Message::text(msg.to_text())).await.is_err() {
                tracing::debug!(admin_id = %admin.id, "ws send failed");
                return;
            }
        }
    }

    tracing::debug!(admin_id = %admin.id, "ws connection closed");
}

/// Parses a text frame and runs the command it carries.
async fn handle_text_message<S: AdminStore, B: BlobStore>(
    text: &str,
    views: &mut LiveViews<S, B>,
) -> Vec<WsMessage> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return vec![WsMessage::error(String::new(), 400, "malformed JSON")];
    };
    if msg.msg_type != WsMessageType::Command {
        return vec![WsMessage::error(msg.id, 400, "expected a command message")];
    }
    match serde_json::from_value::<WsCommand>(msg.payload) {
        Ok(command) => views.handle_command(&msg.id, command).await,
        Err(e) => vec![WsMessage::error(msg.id, 404, format!("unknown command: {e}"))],
    }
}
