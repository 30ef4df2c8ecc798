//! Interactive chat peer
//!
//! Joins a room, prints everything the server sends, and relays input
//! lines as chat messages until `/quit` or end of input.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::transport;
use crate::types::RoomId;

/// Input line that ends the session.
pub const QUIT_COMMAND: &str = "/quit";

/// Format a server event for display.
pub fn render(event: &ServerMessage) -> String {
    match event {
        ServerMessage::Notification { room, message } => {
            format!("[room={}][system]: {}", room, message)
        }
        ServerMessage::Text {
            room,
            user,
            message,
        } => format!("[room={}][{}]: {}", room, user, message),
    }
}

/// Chat in `room` as `user` on the relay at `addr`.
///
/// Reads lines from `input` and writes rendered server events to
/// `output`. Returns once the server has closed the connection after we
/// stopped sending.
pub async fn chat<R, W>(
    addr: &str,
    room: RoomId,
    user: &str,
    input: R,
    mut output: W,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", addr)).await?;
    let (mut reader, mut writer) = transport::split(ws);

    writer
        .send_event(&ClientMessage::Join {
            room,
            user: user.to_string(),
        })
        .await?;

    let printer = tokio::spawn(async move {
        loop {
            match reader.next_event::<ServerMessage>().await {
                Ok(Some(event)) => {
                    let line = format!("{}\n", render(&event));
                    if output.write_all(line.as_bytes()).await.is_err() {
                        break;
                    }
                    let _ = output.flush().await;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Receive error: {}", e);
                    break;
                }
            }
        }
    });

    info!("Connected as {:?} in room {}. Type {} to exit.", user, room, QUIT_COMMAND);
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Input error: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == QUIT_COMMAND {
            break;
        }

        let event = ClientMessage::Text {
            room,
            user: user.to_string(),
            message: line.to_string(),
        };
        if let Err(e) = writer.send_event(&event).await {
            warn!("Send error: {}", e);
            break;
        }
    }

    // The server answers our close by closing its side, which ends the printer
    let _ = writer.shutdown().await;
    let _ = printer.await;
    Ok(())
}
