//! Transport trait definition and the WebSocket transport
//!
//! The client only needs text frames in both directions, so the transport
//! seam is kept to a handshake plus send/recv/close on an open connection.

use crate::error::{StreamError, StreamResult};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

/// Opens connections to a telemetry source
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Human-readable endpoint for logs (e.g. the URL)
    fn endpoint(&self) -> &str;

    /// Perform the transport handshake
    async fn connect(&self) -> StreamResult<Box<dyn Connection>>;
}

/// One open connection
#[async_trait]
pub trait Connection: Send {
    async fn send(&mut self, text: String) -> StreamResult<()>;

    /// Next inbound text frame
    ///
    /// Returns:
    /// - `Some(Ok(text))` for a data frame
    /// - `Some(Err(_))` on a transport error
    /// - `None` once the peer has closed the connection
    async fn recv(&mut self) -> Option<StreamResult<String>>;

    async fn close(&mut self);
}

/// WebSocket transport backed by tokio-tungstenite
pub struct WebSocketTransport {
    url: String,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn connect(&self) -> StreamResult<Box<dyn Connection>> {
        let (ws_stream, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| StreamError::Handshake(e.to_string()))?;
        Ok(Box::new(WebSocketConnection { ws: ws_stream }))
    }
}

struct WebSocketConnection {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn send(&mut self, text: String) -> StreamResult<()> {
        self.ws
            .send(Message::Text(text))
            .await
            .map_err(|e| StreamError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<StreamResult<String>> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(data)) => match String::from_utf8(data) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => warn!("Dropping non-UTF-8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    debug!("WebSocket closed by peer: {:?}", frame);
                    return None;
                }
                // Ping/pong are answered by tungstenite itself
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Err(e) => return Some(Err(StreamError::Transport(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.ws.close(None).await {
            debug!("WebSocket close error: {}", e);
        }
    }
}
