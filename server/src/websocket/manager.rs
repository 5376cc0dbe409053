//! Live subscriber hub.
//!
//! Tracks websocket subscribers per match and fans snapshots out to
//! them. Sends go through unbounded channels, so publishing never waits
//! on a slow client.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use wicket_engine::MatchId;

use super::ServerMessage;

/// Sender for WebSocket messages.
pub type MessageSender = mpsc::UnboundedSender<ServerMessage>;

/// A single live subscriber.
#[derive(Debug)]
pub struct Subscriber {
    /// Unique identifier for this connection
    pub id: String,
    pub match_id: MatchId,
    /// Channel to send messages to this connection
    pub sender: MessageSender,
}

/// Manages live subscribers across all matches.
///
/// Thread-safe and can be shared across handlers via `Arc`.
#[derive(Debug, Default)]
pub struct SubscriberHub {
    /// All subscribers, keyed by connection ID.
    subscribers: DashMap<String, Subscriber>,
    /// Connection IDs per match.
    by_match: DashMap<MatchId, Vec<String>>,
}

impl SubscriberHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a subscriber for a match. Returns the connection ID.
    pub fn register(&self, match_id: &str, sender: MessageSender) -> String {
        let conn_id = uuid::Uuid::new_v4().to_string();

        self.subscribers.insert(
            conn_id.clone(),
            Subscriber {
                id: conn_id.clone(),
                match_id: match_id.to_string(),
                sender,
            },
        );
        self.by_match
            .entry(match_id.to_string())
            .or_default()
            .push(conn_id.clone());

        tracing::info!(conn_id = %conn_id, match_id = %match_id, "Subscriber registered");

        conn_id
    }

    /// Remove a subscriber. Unknown IDs are ignored.
    pub fn unregister(&self, conn_id: &str) {
        if let Some((_, subscriber)) = self.subscribers.remove(conn_id) {
            if let Some(mut conn_ids) = self.by_match.get_mut(&subscriber.match_id) {
                conn_ids.retain(|id| id != conn_id);
                if conn_ids.is_empty() {
                    drop(conn_ids);
                    self.by_match
                        .remove_if(&subscriber.match_id, |_, ids| ids.is_empty());
                }
            }

            tracing::info!(
                conn_id = %conn_id,
                match_id = %subscriber.match_id,
                "Subscriber unregistered"
            );
        }
    }

    /// Send a message to every subscriber of a match.
    ///
    /// Subscribers whose channel is closed are dropped. Returns the number
    /// of subscribers that received the message.
    pub fn publish(&self, match_id: &str, message: &ServerMessage) -> usize {
        let conn_ids = match self.by_match.get(match_id) {
            Some(ids) => ids.clone(),
            None => return 0,
        };

        let mut sent = 0;
        let mut dead = Vec::new();
        for conn_id in conn_ids {
            let delivered = self
                .subscribers
                .get(&conn_id)
                .is_some_and(|s| s.sender.send(message.clone()).is_ok());
            if delivered {
                sent += 1;
            } else {
                dead.push(conn_id);
            }
        }
        for conn_id in &dead {
            self.unregister(conn_id);
        }

        tracing::debug!(
            match_id = %match_id,
            recipients = sent,
            dropped = dead.len(),
            version = ?message.version(),
            "Published to subscribers"
        );

        sent
    }

    /// Send a message to one connection.
    pub fn send_to(&self, conn_id: &str, message: ServerMessage) -> bool {
        self.subscribers
            .get(conn_id)
            .is_some_and(|s| s.sender.send(message).is_ok())
    }

    pub fn subscriber_count(&self, match_id: &str) -> usize {
        self.by_match.get(match_id).map_or(0, |ids| ids.len())
    }

    pub fn connection_count(&self) -> usize {
        self.subscribers.len()
    }
}
