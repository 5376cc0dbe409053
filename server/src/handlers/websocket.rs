//! Live scoreboard connections.
//!
//! A connection is a subscriber first: it gets the current snapshot on
//! attach and every published snapshot after that. It may also score
//! through the same socket, in which case the direct reply is an
//! `accepted` or `rejected` acknowledgement and the new snapshot arrives
//! through the hub like everyone else's.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::registry::MatchRegistry;
use crate::websocket::{ClientMessage, ServerMessage};

use super::handle_command;

/// Drive one live connection until the client goes away.
pub async fn handle_live_connection(
    socket: WebSocket,
    registry: Arc<MatchRegistry>,
    match_id: String,
) {
    let (mut sink, mut stream) = socket.split();
    let (outbox, inbox) = mpsc::unbounded_channel::<ServerMessage>();

    let conn_id = match registry.subscribe(&match_id, outbox).await {
        Ok(conn_id) => conn_id,
        Err(e) => {
            tracing::warn!(match_id = %match_id, "Subscription refused: {}", e);
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
    };
    tracing::info!(conn_id = %conn_id, match_id = %match_id, "Live client connected");

    let writer = spawn_writer(sink, inbox, conn_id.clone());

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                registry
                    .hub()
                    .send_to(&conn_id, ServerMessage::error("binary frames are not accepted"));
                continue;
            }
            // axum answers pings itself
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, "Live socket read failed: {}", e);
                break;
            }
        };

        let reply = process_message(&text, &registry, &match_id).await;
        registry.hub().send_to(&conn_id, reply);
    }

    registry.hub().unregister(&conn_id);
    writer.abort();

    tracing::info!(
        conn_id = %conn_id,
        match_id = %match_id,
        subscribers = registry.hub().subscriber_count(&match_id),
        "Live client disconnected"
    );
}

/// Serialize queued messages onto the socket.
///
/// Stops at the first failed write; the hub notices the closed channel on
/// its next publish and drops the subscriber.
fn spawn_writer(
    mut sink: SplitSink<WebSocket, Message>,
    mut inbox: mpsc::UnboundedReceiver<ServerMessage>,
    conn_id: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(conn_id = %conn_id, "Unserializable live message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                tracing::debug!(conn_id = %conn_id, "Live socket closed while writing");
                break;
            }
        }
    })
}

/// Answer one client message.
async fn process_message(text: &str, registry: &MatchRegistry, match_id: &str) -> ServerMessage {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => return ServerMessage::error(format!("unreadable message: {}", e)),
    };

    match message {
        ClientMessage::Score {
            command,
            request_id,
        } => match handle_command(registry, match_id, command).await {
            Ok(snapshot) => ServerMessage::Accepted {
                version: snapshot.version,
                request_id,
            },
            Err(e) => ServerMessage::rejected(e.code(), e.to_string(), request_id),
        },
        ClientMessage::Snapshot => match registry.snapshot(match_id).await {
            Ok(snapshot) => ServerMessage::snapshot(snapshot),
            Err(e) => ServerMessage::error(e.to_string()),
        },
        ClientMessage::Ping => ServerMessage::Pong,
    }
}
