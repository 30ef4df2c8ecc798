//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization.

use serde::{Deserialize, Serialize};

use crate::types::RoomId;

/// Client → Server message
///
/// Uses tagged enum with snake_case naming. Tags this server does not know
/// decode to `Unknown` instead of failing. Missing fields decode to their
/// defaults, so an absent username arrives as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a room under a username (must be the first message)
    Join {
        #[serde(default)]
        room: RoomId,
        #[serde(default)]
        user: String,
    },
    /// Send a chat message to the joined room
    ///
    /// `room` and `user` are informational; the server attributes text to
    /// the session that sent it.
    Text {
        #[serde(default)]
        room: RoomId,
        #[serde(default)]
        user: String,
        message: String,
    },
    /// Any message type this server does not understand
    #[serde(other)]
    Unknown,
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// System-originated notice
    Notification { room: RoomId, message: String },
    /// Peer-originated chat message
    Text {
        room: RoomId,
        user: String,
        message: String,
    },
}

impl ServerMessage {
    /// Notice on the sentinel room, sent before a session is registered.
    pub fn system(message: impl Into<String>) -> Self {
        ServerMessage::Notification {
            room: RoomId::SYSTEM,
            message: message.into(),
        }
    }

    pub fn joined(room: RoomId, user: &str) -> Self {
        ServerMessage::Notification {
            room,
            message: format!("{} joined the room", user),
        }
    }

    pub fn left(room: RoomId, user: &str) -> Self {
        ServerMessage::Notification {
            room,
            message: format!("{} left the room", user),
        }
    }
}
