//! WebSocket channel transport speaking the relay protocol of `typefast-server`.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::{
    sync::mpsc::{self, error::TryRecvError},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use typefast_shared::protocol::{ClientFrame, ServerFrame};

use crate::error::ChannelError;

use super::{ChannelLink, ChannelTransport};

/// Opens one WebSocket connection per subscription
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    base_url: String,
}

impl WebSocketTransport {
    /// `server_url` may be given as `http(s)://` or `ws(s)://`
    pub fn new(server_url: &str) -> Self {
        let trimmed = server_url.trim_end_matches('/');
        let base_url = if let Some(rest) = trimmed.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else if let Some(rest) = trimmed.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else {
            trimmed.to_string()
        };
        Self { base_url }
    }

    pub fn subscribe_url(&self, topic: &str, key: &str) -> String {
        format!("{}/ws?topic={}&key={}", self.base_url, topic, key)
    }
}

#[async_trait]
impl ChannelTransport for WebSocketTransport {
    async fn open(&self, topic: &str, key: &str) -> Result<Box<dyn ChannelLink>, ChannelError> {
        let url = self.subscribe_url(topic, key);
        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            let error_msg = e.to_string();
            // The relay answers 503 when the topic is full
            if error_msg.contains("503") {
                ChannelError::Rejected(format!("topic '{}' is full", topic))
            } else {
                ChannelError::ConnectionError(error_msg)
            }
        })?;
        tracing::debug!("Connected to {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel::<ClientFrame>();
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel::<ServerFrame>();

        // Frames from the relay
        let read_task = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerFrame>(text.as_str()) {
                            Ok(frame) => {
                                if incoming_tx.send(frame).is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("Unparseable frame from relay: {}", e),
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Relay closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        });

        // Frames to the relay; ends after `leave` or when the link is dropped
        tokio::spawn(async move {
            while let Some(frame) = outgoing_rx.recv().await {
                let is_leave = matches!(frame, ClientFrame::Leave);
                let json = match serde_json::to_string(&frame) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize frame: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send frame: {}", e);
                    break;
                }
                if is_leave {
                    break;
                }
            }
            let _ = write.close().await;
        });

        Ok(Box::new(WebSocketLink {
            outgoing: Some(outgoing_tx),
            incoming: incoming_rx,
            read_task,
        }))
    }
}

struct WebSocketLink {
    outgoing: Option<mpsc::UnboundedSender<ClientFrame>>,
    incoming: mpsc::UnboundedReceiver<ServerFrame>,
    read_task: JoinHandle<()>,
}

#[async_trait]
impl ChannelLink for WebSocketLink {
    fn send(&mut self, frame: ClientFrame) -> Result<(), ChannelError> {
        let outgoing = self.outgoing.as_ref().ok_or(ChannelError::Closed)?;
        outgoing.send(frame).map_err(|_| ChannelError::Closed)
    }

    async fn recv(&mut self) -> Option<ServerFrame> {
        self.incoming.recv().await
    }

    fn try_recv(&mut self) -> Result<ServerFrame, TryRecvError> {
        self.incoming.try_recv()
    }

    fn close(&mut self) {
        if let Some(outgoing) = self.outgoing.take() {
            let _ = outgoing.send(ClientFrame::Leave);
        }
        self.read_task.abort();
        self.incoming.close();
    }
}

impl Drop for WebSocketLink {
    fn drop(&mut self) {
        self.close();
    }
}
