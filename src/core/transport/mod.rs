//! Duplex frame transport used by the speech sessions.
//!
//! Every vendor protocol here runs over a bidirectional, message-oriented
//! connection: text frames carry the JSON envelopes, binary frames carry
//! audio. Sessions talk to the connection through the small traits in this
//! module so the protocol logic is independent of the socket; the production
//! implementation is [`WsTransport`] over `tokio-tungstenite`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

#[cfg(test)]
pub(crate) mod fake;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Errors from the transport layer.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}

/// One discrete message exchanged over the connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Bytes),
}

/// Outbound half of a duplex connection.
#[async_trait]
pub trait FrameSink: Send + 'static {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Initiate connection shutdown. Called exactly once per session.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a duplex connection.
#[async_trait]
pub trait FrameSource: Send + 'static {
    /// The next data frame, or `None` once the peer has closed the
    /// connection. Control frames (ping/pong) are consumed internally.
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError>;
}

/// A duplex connection that can be split into independently owned halves, so
/// the outbound pacer and the inbound reader can run as separate tasks.
pub trait Transport: Send + 'static {
    type Sink: FrameSink;
    type Source: FrameSource;

    fn into_split(self) -> (Self::Sink, Self::Source);
}

/// WebSocket transport.
pub struct WsTransport {
    inner: WsStream,
}

impl WsTransport {
    /// Dial the vendor endpoint described by `request` (URL plus any
    /// authentication headers the caller attached).
    pub async fn connect(request: Request) -> Result<Self, TransportError> {
        let (stream, response) = connect_async(request)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        debug!(status = %response.status(), "websocket connected");
        Ok(Self { inner: stream })
    }
}

impl Transport for WsTransport {
    type Sink = WsFrameSink;
    type Source = WsFrameSource;

    fn into_split(self) -> (Self::Sink, Self::Source) {
        let (sink, stream) = self.inner.split();
        (WsFrameSink { inner: sink }, WsFrameSource { inner: stream })
    }
}

/// Outbound half of a [`WsTransport`].
pub struct WsFrameSink {
    inner: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        let message = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data),
        };
        self.inner
            .send(message)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // A failed close handshake is not worth failing the call over; the
        // connection is going away either way.
        if let Err(e) = self.inner.send(Message::Close(None)).await {
            debug!("websocket close handshake failed: {e}");
        }
        Ok(())
    }
}

/// Inbound half of a [`WsTransport`].
pub struct WsFrameSource {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(Frame::Text(text.as_str().to_owned())));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(Frame::Binary(data)));
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                    // Keep-alive traffic; tungstenite answers pings itself.
                    continue;
                }
                Some(Ok(Message::Close(close_frame))) => {
                    debug!("websocket closed by peer: {close_frame:?}");
                    return Ok(None);
                }
                Some(Ok(other)) => {
                    warn!("unexpected websocket frame: {other:?}");
                    continue;
                }
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(e.to_string()));
                }
                None => return Ok(None),
            }
        }
    }
}
