//! Error types for the chat relay
//!
//! One enum per layer (hub, session, transport, config) plus the
//! top-level `AppError`. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::message::ServerMessage;
use crate::types::RoomId;

/// Room registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// The (room, user) pair is already registered
    #[error("user {user:?} already joined room {room}")]
    AlreadyJoined { room: RoomId, user: String },

    /// Remove of a room or member that is not present
    #[error("user {user:?} is not registered in room {room}")]
    NotFound { room: RoomId, user: String },

    /// Text sent to a room with no members
    #[error("room {0} doesn't exist")]
    RoomNotFound(RoomId),

    /// Text sent by a user who is not a member of the room
    #[error("user {user:?} is not assigned to room {room}")]
    SenderNotMember { room: RoomId, user: String },
}

/// Transport (connection-layer) errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Frame could not be encoded or decoded
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The other side of the connection is gone
    #[error("connection closed")]
    Disconnected,
}

/// Session errors
///
/// Any of these ends the session that produced it and nothing else.
#[derive(Debug, Error)]
pub enum SessionError {
    /// First message was not a usable join
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Join rejected by the registry
    #[error("user is already registered: {0}")]
    AlreadyJoined(HubError),

    /// Receive failed before the session was registered
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// Notice to send to the peer before the connection is torn down.
    ///
    /// Transport failures have no notice: the peer is unreachable.
    pub fn notice(&self) -> Option<ServerMessage> {
        match self {
            SessionError::InvalidArgument(_) => {
                Some(ServerMessage::system("join (room, user) required"))
            }
            SessionError::AlreadyJoined(_) => {
                Some(ServerMessage::system("user is already registered"))
            }
            SessionError::Transport(_) => None,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("mailbox capacity must be greater than zero")]
    ZeroMailboxCapacity,

    #[error("bind address must not be empty")]
    EmptyBindAddr,
}

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),
}
