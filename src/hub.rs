//! Room registry
//!
//! Single source of truth for room membership: room → username → mailbox.
//! One reader/writer lock guards the whole table. Mutations take it
//! exclusively, broadcasts and membership checks take it shared, and no
//! lock is ever held while enqueueing, closing a mailbox, or doing I/O.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::HubError;
use crate::mailbox::{Enqueued, Mailbox};
use crate::message::ServerMessage;
use crate::types::RoomId;

/// Per-broadcast delivery tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Recipients whose mailbox accepted the event.
    pub queued: usize,
    /// Recipients whose mailbox was full.
    pub dropped: usize,
}

/// Concurrent room membership table
///
/// Invariant: a room is present iff it has at least one member.
#[derive(Debug, Default)]
pub struct Hub {
    rooms: RwLock<HashMap<RoomId, HashMap<String, Mailbox>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user` in `room`, creating the room if needed.
    pub async fn add(&self, room: RoomId, user: &str, mailbox: Mailbox) -> Result<(), HubError> {
        let mut rooms = self.rooms.write().await;
        let members = rooms.entry(room).or_default();
        if members.contains_key(user) {
            // an existing entry is never empty, so nothing was created here
            return Err(HubError::AlreadyJoined {
                room,
                user: user.to_string(),
            });
        }
        members.insert(user.to_string(), mailbox);
        info!(%room, user, members = members.len(), "joined");
        Ok(())
    }

    /// Unregister `user` from `room`, pruning the room if it becomes empty.
    ///
    /// The returned mailbox is still open; the caller closes it after the
    /// lock has been released.
    pub async fn remove(&self, room: RoomId, user: &str) -> Result<Mailbox, HubError> {
        let mut rooms = self.rooms.write().await;
        let not_found = || HubError::NotFound {
            room,
            user: user.to_string(),
        };

        let members = rooms.get_mut(&room).ok_or_else(not_found)?;
        let mailbox = members.remove(user).ok_or_else(not_found)?;
        if members.is_empty() {
            rooms.remove(&room);
            debug!(%room, "room deleted (empty)");
        }
        info!(%room, user, "removed");
        Ok(mailbox)
    }

    /// Offer `event` to every current member of `room`.
    ///
    /// Member mailboxes are copied under the read lock and written to
    /// after it is released. A mailbox that is full drops the event.
    pub async fn broadcast(&self, room: RoomId, event: ServerMessage) -> Delivery {
        let recipients: Vec<Mailbox> = {
            let rooms = self.rooms.read().await;
            match rooms.get(&room) {
                Some(members) => members.values().cloned().collect(),
                None => return Delivery::default(),
            }
        };

        let mut delivery = Delivery::default();
        for mailbox in &recipients {
            match mailbox.enqueue(event.clone()) {
                Enqueued::Queued => delivery.queued += 1,
                Enqueued::Dropped => delivery.dropped += 1,
                Enqueued::Closed => {}
            }
        }
        if delivery.dropped > 0 {
            warn!(%room, dropped = delivery.dropped, "broadcast dropped events");
        }
        delivery
    }

    /// Broadcast a chat message from `from_user` to `room`.
    ///
    /// Empty messages are ignored.
    pub async fn text_to(&self, room: RoomId, from_user: &str, message: &str) -> Result<(), HubError> {
        debug!(%room, user = from_user, "text");
        if message.is_empty() {
            return Ok(());
        }

        {
            let rooms = self.rooms.read().await;
            let members = rooms.get(&room).ok_or(HubError::RoomNotFound(room))?;
            if !members.contains_key(from_user) {
                return Err(HubError::SenderNotMember {
                    room,
                    user: from_user.to_string(),
                });
            }
        }

        let event = ServerMessage::Text {
            room,
            user: from_user.to_string(),
            message: message.to_string(),
        };
        self.broadcast(room, event).await;
        Ok(())
    }

    /// Usernames registered in `room`, sorted.
    pub async fn members(&self, room: RoomId) -> Vec<String> {
        let rooms = self.rooms.read().await;
        let mut users: Vec<String> = rooms
            .get(&room)
            .map(|members| members.keys().cloned().collect())
            .unwrap_or_default();
        users.sort();
        users
    }

    pub async fn contains_room(&self, room: RoomId) -> bool {
        self.rooms.read().await.contains_key(&room)
    }

    /// Number of non-empty rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
