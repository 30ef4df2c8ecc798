//! Per-connection session
//!
//! Drives one client through `AwaitingJoin → Active → Terminated`:
//!
//! - the first event must be a `join` with a non-empty username, otherwise
//!   the peer gets a system notice and the connection is closed
//! - once registered, `text` events are relayed to the room and everything
//!   else is ignored
//! - when the inbound stream ends or fails, the member is removed, its
//!   mailbox closed, and the room told that it left

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::hub::Hub;
use crate::mailbox::Mailbox;
use crate::message::{ClientMessage, ServerMessage};
use crate::transport::{EventSink, EventSource};
use crate::types::RoomId;

/// Lifecycle of a session. There is no way back to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingJoin,
    Active,
    Terminated,
}

/// Protocol state machine for one connection
pub struct Session {
    hub: Arc<Hub>,
    mailbox_capacity: usize,
    state: SessionState,
}

impl Session {
    pub fn new(hub: Arc<Hub>, mailbox_capacity: usize) -> Self {
        Self {
            hub,
            mailbox_capacity,
            state: SessionState::AwaitingJoin,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion.
    ///
    /// Returns `Ok` when the peer disconnects, whether or not it ever
    /// joined. Errors are returned only for sessions that never became
    /// active.
    pub async fn run<S, K>(&mut self, mut source: S, mut sink: K) -> Result<(), SessionError>
    where
        S: EventSource,
        K: EventSink,
    {
        let (room, user) = match self.await_join(&mut source).await {
            Ok(Some(join)) => join,
            Ok(None) => {
                debug!("peer left before joining");
                self.state = SessionState::Terminated;
                return Ok(());
            }
            Err(e) => return Err(self.reject(&mut sink, e).await),
        };

        let (mailbox, outbox) = Mailbox::new(user.clone(), self.mailbox_capacity);
        if let Err(e) = self.hub.add(room, &user, mailbox).await {
            return Err(self.reject(&mut sink, SessionError::AlreadyJoined(e)).await);
        }
        self.state = SessionState::Active;
        info!(%room, user = %user, "session active");

        // The new member sees its own join notice first
        self.hub.broadcast(room, ServerMessage::joined(room, &user)).await;
        let drain = tokio::spawn(outbox.drain(sink));

        self.relay(&mut source, room, &user).await;
        self.cleanup(room, &user).await;

        if let Err(e) = drain.await {
            warn!("drain task failed: {}", e);
        }
        Ok(())
    }

    async fn await_join<S: EventSource>(
        &self,
        source: &mut S,
    ) -> Result<Option<(RoomId, String)>, SessionError> {
        match source.receive().await? {
            None => Ok(None),
            Some(ClientMessage::Join { room, user }) if !user.is_empty() => Ok(Some((room, user))),
            Some(ClientMessage::Join { .. }) => Err(SessionError::InvalidArgument(
                "join requires a username".to_string(),
            )),
            Some(other) => Err(SessionError::InvalidArgument(format!(
                "expected join, got {:?}",
                other
            ))),
        }
    }

    /// Tell the peer why it is being dropped, then close the connection.
    async fn reject<K: EventSink>(&mut self, sink: &mut K, err: SessionError) -> SessionError {
        warn!("rejecting session: {}", err);
        if let Some(notice) = err.notice() {
            let _ = sink.send(notice).await;
        }
        let _ = sink.close().await;
        self.state = SessionState::Terminated;
        err
    }

    async fn relay<S: EventSource>(&self, source: &mut S, room: RoomId, user: &str) {
        loop {
            match source.receive().await {
                Ok(Some(ClientMessage::Join { .. })) => {
                    debug!(%room, user, "ignoring join, already in the room");
                }
                Ok(Some(ClientMessage::Text { message, .. })) => {
                    // Best effort: a failed relay never ends the session
                    if let Err(e) = self.hub.text_to(room, user, &message).await {
                        warn!(%room, user, "text not delivered: {}", e);
                    }
                }
                Ok(Some(ClientMessage::Unknown)) => {
                    debug!(%room, user, "unknown message type, ignoring");
                }
                Ok(None) => {
                    debug!(%room, user, "peer closed the stream");
                    break;
                }
                Err(e) => {
                    debug!(%room, user, "receive failed: {}", e);
                    break;
                }
            }
        }
    }

    /// Registry removal, then mailbox close, then the leave notice.
    async fn cleanup(&mut self, room: RoomId, user: &str) {
        match self.hub.remove(room, user).await {
            Ok(mailbox) => mailbox.close(),
            Err(e) => debug!("cleanup: {}", e),
        }
        self.hub.broadcast(room, ServerMessage::left(room, user)).await;
        self.state = SessionState::Terminated;
        info!(%room, user, "session terminated");
    }
}
