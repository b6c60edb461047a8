//! Room channel: one pub/sub subscription per room with broadcast and presence.
//!
//! A [`ChannelTransport`] opens a [`ChannelLink`] to a topic; [`RoomChannel`]
//! wraps the link, keeps the latest presence snapshot and turns server frames
//! into [`ChannelEvent`]s. Transport failures never surface as errors here:
//! a channel that could not subscribe (or lost its link) reports
//! `is_connected() == false`.

mod local;
mod websocket;

pub use local::LocalHub;
pub use websocket::WebSocketTransport;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc::error::TryRecvError;
use typefast_shared::protocol::{ClientFrame, PresenceMeta, PresenceState, ServerFrame};

use crate::error::ChannelError;

/// How long `connect` waits for the `subscribed` acknowledgement
pub const SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens subscriptions to topics
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    async fn open(&self, topic: &str, key: &str) -> Result<Box<dyn ChannelLink>, ChannelError>;
}

/// A single open subscription
#[async_trait]
pub trait ChannelLink: Send {
    /// Queue a frame for the relay. Never waits for delivery.
    fn send(&mut self, frame: ClientFrame) -> Result<(), ChannelError>;

    /// Next frame from the relay; `None` once the link is closed.
    async fn recv(&mut self) -> Option<ServerFrame>;

    fn try_recv(&mut self) -> Result<ServerFrame, TryRecvError>;

    /// Unsubscribe. Idempotent.
    fn close(&mut self);
}

/// Events delivered to the owner of a [`RoomChannel`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Broadcast {
        event: String,
        payload: Value,
    },
    PresenceSync(PresenceState),
    PresenceJoin {
        key: String,
        metas: Vec<PresenceMeta>,
    },
    PresenceLeave {
        key: String,
        metas: Vec<PresenceMeta>,
    },
    /// The transport went away; no further events follow
    Closed,
}

pub struct RoomChannel {
    topic: String,
    key: String,
    link: Option<Box<dyn ChannelLink>>,
    presence: PresenceState,
}

impl RoomChannel {
    /// Subscribe to `topic` as `key` and wait for the acknowledgement.
    ///
    /// On rejection or timeout the returned channel is disconnected.
    pub async fn connect(transport: &dyn ChannelTransport, topic: &str, key: &str) -> Self {
        let mut channel = Self {
            topic: topic.to_string(),
            key: key.to_string(),
            link: None,
            presence: PresenceState::default(),
        };

        let mut link = match transport.open(topic, key).await {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!("Failed to subscribe to '{}': {}", topic, e);
                return channel;
            }
        };

        match tokio::time::timeout(SUBSCRIBE_TIMEOUT, link.recv()).await {
            Ok(Some(ServerFrame::Subscribed { .. })) => {
                tracing::info!("Subscribed to '{}' as '{}'", topic, key);
                channel.link = Some(link);
            }
            Ok(Some(ServerFrame::Rejected { reason })) => {
                tracing::warn!("Subscription to '{}' rejected: {}", topic, reason);
                link.close();
            }
            Ok(Some(other)) => {
                tracing::warn!("Unexpected first frame on '{}': {:?}", topic, other);
                link.close();
            }
            Ok(None) => {
                tracing::warn!("Link to '{}' closed before subscription", topic);
            }
            Err(_) => {
                tracing::warn!("Timed out subscribing to '{}'", topic);
                link.close();
            }
        }
        channel
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Latest presence snapshot seen on this channel
    pub fn presence_state(&self) -> &PresenceState {
        &self.presence
    }

    /// Fire-and-forget broadcast to every other subscriber
    pub fn broadcast(&mut self, event: &str, payload: Value) {
        self.send(ClientFrame::Broadcast {
            event: event.to_string(),
            payload,
        });
    }

    /// Announce own presence
    pub fn track_presence(&mut self, meta: PresenceMeta) {
        self.send(ClientFrame::Track { meta });
    }

    fn send(&mut self, frame: ClientFrame) {
        let Some(link) = self.link.as_mut() else {
            tracing::debug!("Dropping frame on disconnected channel '{}'", self.topic);
            return;
        };
        if let Err(e) = link.send(frame) {
            tracing::warn!("Failed to send on '{}': {}", self.topic, e);
        }
    }

    /// Wait for the next event. Returns `None` when the channel is disconnected.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        loop {
            let link = self.link.as_mut()?;
            match link.recv().await {
                Some(frame) => {
                    if let Some(event) = self.apply(frame) {
                        return Some(event);
                    }
                }
                None => return Some(self.lost()),
            }
        }
    }

    /// Next event already delivered, without waiting
    pub fn try_next_event(&mut self) -> Option<ChannelEvent> {
        loop {
            let link = self.link.as_mut()?;
            match link.try_recv() {
                Ok(frame) => {
                    if let Some(event) = self.apply(frame) {
                        return Some(event);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return Some(self.lost()),
            }
        }
    }

    /// Unsubscribe. No events are delivered afterwards.
    pub fn disconnect(&mut self) {
        if let Some(mut link) = self.link.take() {
            tracing::info!("Leaving '{}'", self.topic);
            link.close();
        }
        self.presence = PresenceState::default();
    }

    fn lost(&mut self) -> ChannelEvent {
        tracing::warn!("Connection to '{}' lost", self.topic);
        self.link = None;
        ChannelEvent::Closed
    }

    fn apply(&mut self, frame: ServerFrame) -> Option<ChannelEvent> {
        match frame {
            ServerFrame::Broadcast { event, payload } => {
                Some(ChannelEvent::Broadcast { event, payload })
            }
            ServerFrame::PresenceSync { state } => {
                self.presence = state.clone();
                Some(ChannelEvent::PresenceSync(state))
            }
            ServerFrame::PresenceJoin { key, metas } => {
                self.presence
                    .0
                    .entry(key.clone())
                    .or_default()
                    .extend(metas.iter().cloned());
                Some(ChannelEvent::PresenceJoin { key, metas })
            }
            ServerFrame::PresenceLeave { key, metas } => {
                if let Some(current) = self.presence.0.get_mut(&key) {
                    current.retain(|m| !metas.contains(m));
                    if current.is_empty() {
                        self.presence.0.remove(&key);
                    }
                }
                Some(ChannelEvent::PresenceLeave { key, metas })
            }
            ServerFrame::Rejected { reason } => {
                tracing::warn!("Frame rejected on '{}': {}", self.topic, reason);
                None
            }
            ServerFrame::Subscribed { .. } => None,
        }
    }
}

impl Drop for RoomChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}
