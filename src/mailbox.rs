//! Per-member outbound queue
//!
//! A `Mailbox` decouples room broadcasts from network writes: the hub only
//! ever calls [`Mailbox::enqueue`], which never waits, and a separate drain
//! task moves queued events onto the member's connection.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};
use tracing::{debug, trace};

use crate::message::ServerMessage;
use crate::transport::EventSink;

/// Outcome of a single [`Mailbox::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    Queued,
    /// Queue was full; the event is gone.
    Dropped,
    /// Mailbox was already closed; the event is ignored.
    Closed,
}

#[derive(Debug)]
struct Shared {
    user: String,
    sender: mpsc::Sender<ServerMessage>,
    closed: AtomicBool,
    close_signal: Notify,
    dropped: AtomicU64,
}

/// Handle to a member's outbound queue
///
/// Cheap to clone. The hub stores one per member and broadcast snapshots
/// copy it.
#[derive(Debug, Clone)]
pub struct Mailbox {
    shared: Arc<Shared>,
}

/// Consuming end of a mailbox, run by the drain task.
#[derive(Debug)]
pub struct MailboxReceiver {
    shared: Arc<Shared>,
    receiver: mpsc::Receiver<ServerMessage>,
}

impl Mailbox {
    /// Create a mailbox holding at most `capacity` undelivered events.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(user: impl Into<String>, capacity: usize) -> (Mailbox, MailboxReceiver) {
        // tokio's bounded channel panics on zero capacity
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let shared = Arc::new(Shared {
            user: user.into(),
            sender,
            closed: AtomicBool::new(false),
            close_signal: Notify::new(),
            dropped: AtomicU64::new(0),
        });
        (
            Mailbox {
                shared: Arc::clone(&shared),
            },
            MailboxReceiver { shared, receiver },
        )
    }

    /// Queue an event without waiting.
    ///
    /// A full queue drops the event; a closed mailbox ignores it. Neither
    /// is an error for the caller.
    pub fn enqueue(&self, event: ServerMessage) -> Enqueued {
        if self.is_closed() {
            return Enqueued::Closed;
        }
        match self.shared.sender.try_send(event) {
            Ok(()) => Enqueued::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let total = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(user = %self.shared.user, total, "mailbox full, dropping event");
                Enqueued::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Enqueued::Closed,
        }
    }

    /// Stop accepting events. The drain task exits once the queue is flushed.
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            // notify_one stores a permit if the drain task is not waiting yet
            self.shared.close_signal.notify_one();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Number of events dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    pub fn user(&self) -> &str {
        &self.shared.user
    }
}

impl MailboxReceiver {
    /// Drain queued events into `sink` in FIFO order.
    ///
    /// Returns when the mailbox is closed and empty (closing `sink`), or as
    /// soon as a write fails.
    pub async fn drain<K: EventSink>(mut self, mut sink: K) {
        loop {
            tokio::select! {
                biased;
                event = self.receiver.recv() => {
                    let Some(event) = event else { break };
                    if let Err(e) = sink.send(event).await {
                        debug!(user = %self.shared.user, "write failed, stopping drain: {}", e);
                        return;
                    }
                }
                _ = self.shared.close_signal.notified() => {
                    // Rejects further sends; recv still yields what is queued
                    self.receiver.close();
                }
            }
        }

        trace!(user = %self.shared.user, "mailbox drained");
        if let Err(e) = sink.close().await {
            debug!(user = %self.shared.user, "failed to close outbound stream: {}", e);
        }
    }
}

#[cfg(test)]
impl MailboxReceiver {
    pub(crate) async fn recv(&mut self) -> Option<ServerMessage> {
        self.receiver.recv().await
    }

    pub(crate) fn try_recv(&mut self) -> Option<ServerMessage> {
        self.receiver.try_recv().ok()
    }
}
