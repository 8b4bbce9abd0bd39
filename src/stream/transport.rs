//! Transport seam for the live stream, plus the websocket implementation.

use super::StreamError;
use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Close frame details, when the peer sent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: Option<u16>,
    pub reason: String,
}

/// Inbound traffic, queued by the transport's reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Text(String),
    /// The connection ended; `None` when no close frame was received.
    Closed(Option<CloseInfo>),
}

/// Outbound half of a connection.
#[async_trait]
pub trait FrameSink: Send {
    async fn send_text(&mut self, text: String) -> Result<(), StreamError>;

    /// Best-effort close handshake.
    async fn close(&mut self);
}

/// One open connection: the outbound sink and the inbound event queue.
pub struct Connection {
    pub sink: Box<dyn FrameSink>,
    pub events: mpsc::Receiver<TransportEvent>,
}

/// Opens connections to the streaming endpoint.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Connection, StreamError>;
}

/// Buffered inbound events per connection.
const EVENT_QUEUE_CAPACITY: usize = 64;

/// Websocket connector backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

struct WsSink {
    writer: WsWriter,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), StreamError> {
        self.writer
            .send(Message::Text(text))
            .await
            .map_err(|e| StreamError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.writer.send(Message::Close(None)).await {
            tracing::debug!(error = %e, "Close frame not sent");
        }
        let _ = self.writer.close().await;
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Connection, StreamError> {
        let (socket, _response) =
            tokio_tungstenite::connect_async(url)
                .await
                .map_err(|e| StreamError::Connect {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
        tracing::debug!(url, "Websocket connected");

        let (writer, mut reader) = socket.split();
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                let event = match frame {
                    Ok(Message::Text(text)) => TransportEvent::Text(text),
                    Ok(Message::Close(frame)) => {
                        let info = frame.map(|f| CloseInfo {
                            code: Some(u16::from(f.code)),
                            reason: f.reason.to_string(),
                        });
                        let _ = tx.send(TransportEvent::Closed(info)).await;
                        return;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::debug!(error = %e, "Websocket read failed");
                        break;
                    }
                };
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(TransportEvent::Closed(None)).await;
        });

        Ok(Connection {
            sink: Box::new(WsSink { writer }),
            events: rx,
        })
    }
}
