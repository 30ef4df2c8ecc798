//! Basic type definitions for the chat relay
//!
//! Provides newtype wrappers for type safety:
//! - `RoomId`: integer room identifier carried on the wire
//! - `SessionId`: UUID-based identifier used to correlate session logs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Room identifier (newtype pattern)
///
/// Any `i32` is a valid room. Rooms have no lifecycle of their own: a room
/// exists exactly while it has members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub i32);

impl RoomId {
    /// Sentinel room used for system notices sent before a session joins.
    pub const SYSTEM: RoomId = RoomId(-1);
}

impl From<i32> for RoomId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique session identifier
///
/// Wraps a UUID v4. Only used to tag log lines of one connection; it is
/// never sent to peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
