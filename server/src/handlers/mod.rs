//! Request handlers for scoring and match administration.

mod admin;
mod commands;
mod matches;
mod websocket;

pub use admin::*;
pub use commands::*;
pub use matches::*;
pub use websocket::*;
