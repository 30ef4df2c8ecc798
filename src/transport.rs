//! Transport adapter
//!
//! The session only sees two halves of a connection: an [`EventSource`]
//! yielding decoded client events and an [`EventSink`] accepting server
//! events. The WebSocket implementation carries one JSON document per
//! frame.

use std::future::Future;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::WebSocketStream;
use tracing::trace;

use crate::error::TransportError;
use crate::message::{ClientMessage, ServerMessage};

/// Inbound half of a connection.
pub trait EventSource: Send {
    /// Waits for the next event.
    ///
    /// Returns `Ok(None)` when the peer has ended the stream.
    fn receive(
        &mut self,
    ) -> impl Future<Output = Result<Option<ClientMessage>, TransportError>> + Send;
}

/// Outbound half of a connection.
pub trait EventSink: Send + 'static {
    /// Writes one event. May wait for the peer.
    fn send(
        &mut self,
        event: ServerMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Closes the outbound direction.
    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Splits a WebSocket into a JSON frame reader and writer.
pub fn split<S>(ws: WebSocketStream<S>) -> (FrameReader<S>, FrameWriter<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (sink, stream) = ws.split();
    (FrameReader { inner: stream }, FrameWriter { inner: sink })
}

/// Reading half of a WebSocket, decoding JSON frames.
pub struct FrameReader<S> {
    inner: SplitStream<WebSocketStream<S>>,
}

impl<S> FrameReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Reads frames until one carries an event.
    ///
    /// Control frames are skipped. A close frame or the end of the
    /// underlying stream yields `Ok(None)`.
    pub async fn next_event<T: DeserializeOwned>(&mut self) -> Result<Option<T>, TransportError> {
        while let Some(frame) = self.inner.next().await {
            match frame {
                Ok(Message::Text(text)) => return Ok(Some(serde_json::from_str(&text)?)),
                Ok(Message::Binary(data)) => return Ok(Some(serde_json::from_slice(&data)?)),
                Ok(Message::Close(_)) => return Ok(None),
                Ok(other) => {
                    // Pong is handled automatically by tungstenite
                    trace!("skipping control frame: {:?}", other);
                }
                Err(tungstenite::Error::ConnectionClosed) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}

impl<S> EventSource for FrameReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn receive(&mut self) -> Result<Option<ClientMessage>, TransportError> {
        self.next_event().await
    }
}

/// Writing half of a WebSocket, encoding events as JSON text frames.
pub struct FrameWriter<S> {
    inner: SplitSink<WebSocketStream<S>, Message>,
}

impl<S> FrameWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub async fn send_event<T: Serialize>(&mut self, event: &T) -> Result<(), TransportError> {
        let json = serde_json::to_string(event)?;
        self.inner.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Sends a close frame.
    pub async fn shutdown(&mut self) -> Result<(), TransportError> {
        self.inner.close().await?;
        Ok(())
    }
}

impl<S> EventSink for FrameWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&mut self, event: ServerMessage) -> Result<(), TransportError> {
        self.send_event(&event).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.shutdown().await
    }
}
