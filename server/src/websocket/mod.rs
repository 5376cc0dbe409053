//! WebSocket support for live scoreboards.
//!
//! Viewers connect per match and receive a full snapshot on connect and
//! after every admitted command. Scorers may also send commands over the
//! same connection.

mod manager;
mod protocol;

pub use manager::{MessageSender, SubscriberHub};
pub use protocol::*;
