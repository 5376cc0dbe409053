//! WebSocket message protocol definitions.
//!
//! All messages are JSON-encoded and use snake_case for tags and field
//! names. Engine payloads inside them keep their own camelCase form.

use serde::{Deserialize, Serialize};
use wicket_engine::{Command, LiveSnapshot, Version};

/// Messages sent from client to server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Score a delivery or correct the last one.
    Score {
        command: Command,
        /// Request ID for correlating responses
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Ask for the current snapshot, e.g. after missing messages.
    Snapshot,

    /// Keep-alive ping.
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full match state. Sent on connect, on request, and after every
    /// admitted command.
    Snapshot { snapshot: Box<LiveSnapshot> },

    /// A score message was admitted.
    Accepted {
        version: Version,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// A score message was rejected; nothing changed.
    Rejected {
        code: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Response to ping.
    Pong,

    /// Malformed message.
    Error { message: String },
}

impl ServerMessage {
    pub fn snapshot(snapshot: LiveSnapshot) -> Self {
        ServerMessage::Snapshot {
            snapshot: Box::new(snapshot),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn rejected(code: &str, message: impl Into<String>, request_id: Option<String>) -> Self {
        ServerMessage::Rejected {
            code: code.to_string(),
            message: message.into(),
            request_id,
        }
    }

    /// Version carried by a snapshot message.
    pub fn version(&self) -> Option<Version> {
        match self {
            ServerMessage::Snapshot { snapshot } => Some(snapshot.version),
            _ => None,
        }
    }
}
