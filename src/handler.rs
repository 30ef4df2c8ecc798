//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake, then hands
//! both halves of the socket to a [`Session`].

use std::sync::Arc;

use tokio::net::TcpStream;
use tracing::{debug, info, info_span, Instrument};

use crate::error::AppError;
use crate::hub::Hub;
use crate::session::Session;
use crate::transport;
use crate::types::SessionId;

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake and runs the session until the peer
/// goes away. Returns an error only if the handshake fails or the session
/// is rejected before joining.
pub async fn handle_connection(
    stream: TcpStream,
    hub: Arc<Hub>,
    mailbox_capacity: usize,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let session_id = SessionId::new();

    let span = info_span!("session", id = %session_id, peer = %peer_addr);
    async move {
        debug!("New TCP connection");

        // WebSocket handshake
        let ws_stream = tokio_tungstenite::accept_async(stream).await?;
        let (source, sink) = transport::split(ws_stream);
        info!("Client connected");

        let mut session = Session::new(hub, mailbox_capacity);
        session.run(source, sink).await?;

        info!("Client disconnected");
        Ok::<(), AppError>(())
    }
    .instrument(span)
    .await
}
