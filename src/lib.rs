//! Room-based WebSocket Chat Relay Library
//!
//! Clients join numbered rooms, exchange text, and receive membership
//! notifications over a single WebSocket connection each.
//!
//! # Features
//! - Rooms created on first join and removed when the last member leaves
//! - Usernames unique within a room
//! - Join/leave notifications to every member of the room
//! - Best-effort fan-out: a slow client never stalls the room
//!
//! # Architecture
//! - `Hub` is the shared room registry behind one reader/writer lock
//! - Each connection runs a `Session` task (receive loop)
//! - Each member owns a bounded `Mailbox` drained by its own task; broadcasts
//!   only ever enqueue without waiting, and drop events for full mailboxes
//!
//! # Example
//! ```ignore
//! use chat_relay::{ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chat_relay::AppError> {
//!     let server = ChatServer::bind(ServerConfig::new("127.0.0.1:1990")).await?;
//!     server.run().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod hub;
pub mod mailbox;
pub mod message;
pub mod peer;
pub mod server;
pub mod session;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use config::ServerConfig;
pub use error::{AppError, ConfigError, HubError, SessionError, TransportError};
pub use handler::handle_connection;
pub use hub::{Delivery, Hub};
pub use mailbox::{Enqueued, Mailbox, MailboxReceiver};
pub use message::{ClientMessage, ServerMessage};
pub use server::ChatServer;
pub use session::{Session, SessionState};
pub use transport::{EventSink, EventSource};
pub use types::{RoomId, SessionId};
