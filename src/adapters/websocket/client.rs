//! WebSocket transport over tokio-tungstenite.
//!
//! Each connection gets a pump task that owns the socket:
//! 1. Forward outbound text frames from the [`Link`] sender to the socket
//! 2. Forward inbound frames to the [`Link`] receiver as [`LinkEvent`]s
//! 3. Send a close frame once the outbound sender is dropped
//! 4. Exit when either side goes away

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use url::Url;

use crate::ports::{CloseReason, InboundFrame, Link, LinkEvent, Transport, TransportError};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Opens real WebSocket connections.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    connect_timeout: Duration,
}

impl WebSocketTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self, endpoint: &Url) -> Result<Link, TransportError> {
        let (socket, response) =
            tokio::time::timeout(self.connect_timeout, connect_async(endpoint.as_str()))
                .await
                .map_err(|_| TransportError::Timeout(self.connect_timeout))?
                .map_err(map_connect_error)?;

        tracing::debug!(
            endpoint = %endpoint,
            status = %response.status(),
            "WebSocket handshake complete"
        );

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(socket, outbound_rx, inbound_tx));

        Ok(Link {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}

fn map_connect_error(err: tungstenite::Error) -> TransportError {
    match err {
        tungstenite::Error::Io(e) => TransportError::Refused(e.to_string()),
        tungstenite::Error::Http(response) => {
            TransportError::Protocol(format!("server answered {}", response.status()))
        }
        other => TransportError::Protocol(other.to_string()),
    }
}

/// Owns the socket for the lifetime of one connection.
async fn pump(
    socket: Socket,
    mut outbound: mpsc::UnboundedReceiver<String>,
    inbound: mpsc::UnboundedSender<LinkEvent>,
) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(WsMessage::Text(text)).await {
                        tracing::debug!("Send error, closing connection: {}", e);
                        let _ = inbound.send(LinkEvent::Failed(e.to_string()));
                        break;
                    }
                }
                None => {
                    // Owner released the link.
                    let _ = sink.send(WsMessage::Close(None)).await;
                    let _ = sink.close().await;
                    break;
                }
            },
            message = stream.next() => {
                let event = match message {
                    Some(Ok(WsMessage::Text(text))) => LinkEvent::Frame(InboundFrame::Text(text)),
                    Some(Ok(WsMessage::Binary(bytes))) => {
                        LinkEvent::Frame(InboundFrame::Binary(bytes))
                    }
                    // Control frames are answered by tungstenite itself.
                    Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {
                        continue
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        let reason = frame
                            .map(|f| CloseReason::new(Some(u16::from(f.code)), f.reason.to_string()))
                            .unwrap_or_else(|| CloseReason::new(None, ""));
                        let _ = inbound.send(LinkEvent::Closed(reason));
                        break;
                    }
                    Some(Err(e)) => {
                        let _ = inbound.send(LinkEvent::Failed(e.to_string()));
                        break;
                    }
                    None => {
                        let _ = inbound.send(LinkEvent::Closed(CloseReason::abnormal()));
                        break;
                    }
                };
                if inbound.send(event).is_err() {
                    // Owner dropped the receiver; nobody is listening.
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(
            WebSocketTransport::default().connect_timeout(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn io_errors_map_to_refused() {
        let err = tungstenite::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(map_connect_error(err), TransportError::Refused(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_without_panicking() {
        // Port 1 on loopback is never listening in test environments.
        let transport = WebSocketTransport::new(Duration::from_secs(2));
        let url = Url::parse("ws://127.0.0.1:1/ws").unwrap();
        let result = transport.connect(&url).await;
        assert!(result.is_err());
    }
}
