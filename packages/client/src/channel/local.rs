//! In-process channel transport.
//!
//! Frames are dispatched synchronously while `send` runs, so a peer sees a
//! broadcast as soon as the sender's call returns. Used by tests and by the
//! offline demo.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TryRecvError};
use typefast_shared::protocol::{ClientFrame, PresenceMeta, PresenceState, ServerFrame};

use crate::error::ChannelError;

use super::{ChannelLink, ChannelTransport};

struct LocalSubscriber {
    id: u64,
    key: String,
    meta: Option<PresenceMeta>,
    sender: mpsc::UnboundedSender<ServerFrame>,
}

struct HubState {
    available: bool,
    next_id: u64,
    topics: HashMap<String, Vec<LocalSubscriber>>,
}

impl HubState {
    fn presence(&self, topic: &str) -> PresenceState {
        let subscribers = self.topics.get(topic).map(Vec::as_slice).unwrap_or_default();
        PresenceState::from_tracked(
            subscribers
                .iter()
                .filter_map(|s| s.meta.as_ref().map(|m| (s.key.as_str(), m))),
        )
    }

    fn push_all(&self, topic: &str, frame: &ServerFrame, exclude: Option<u64>) {
        let Some(subscribers) = self.topics.get(topic) else {
            return;
        };
        for subscriber in subscribers.iter().filter(|s| Some(s.id) != exclude) {
            // A receiver dropped without close() is cleaned up on its own close
            let _ = subscriber.sender.send(frame.clone());
        }
    }

    fn push_presence_sync(&self, topic: &str) {
        let frame = ServerFrame::PresenceSync {
            state: self.presence(topic),
        };
        self.push_all(topic, &frame, None);
    }
}

/// In-memory relay shared by every client of a test or demo
#[derive(Clone)]
pub struct LocalHub {
    state: Arc<Mutex<HubState>>,
}

impl Default for LocalHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHub {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                available: true,
                next_id: 0,
                topics: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// While unavailable, new subscriptions are rejected
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.lock().topics.get(topic).map_or(0, Vec::len)
    }

    /// Drop every subscription of `topic` as if the transport went down
    pub fn close_topic(&self, topic: &str) {
        let removed = self.lock().topics.remove(topic);
        if let Some(subscribers) = removed {
            tracing::debug!("Closed '{}' ({} subscriber(s))", topic, subscribers.len());
        }
    }

    fn dispatch(&self, topic: &str, id: u64, frame: ClientFrame) -> Result<(), ChannelError> {
        let mut state = self.lock();
        let Some(subscriber) = state
            .topics
            .get_mut(topic)
            .and_then(|subs| subs.iter_mut().find(|s| s.id == id))
        else {
            return Err(ChannelError::Closed);
        };

        match frame {
            ClientFrame::Track { meta } => {
                subscriber.meta = Some(meta.clone());
                let join = ServerFrame::PresenceJoin {
                    key: subscriber.key.clone(),
                    metas: vec![meta],
                };
                state.push_all(topic, &join, None);
                state.push_presence_sync(topic);
            }
            ClientFrame::Broadcast { event, payload } => {
                state.push_all(topic, &ServerFrame::Broadcast { event, payload }, Some(id));
            }
            ClientFrame::Leave => {
                drop(state);
                self.unsubscribe(topic, id);
            }
        }
        Ok(())
    }

    fn unsubscribe(&self, topic: &str, id: u64) {
        let mut state = self.lock();
        let Some(subscribers) = state.topics.get_mut(topic) else {
            return;
        };
        let Some(position) = subscribers.iter().position(|s| s.id == id) else {
            return;
        };
        let removed = subscribers.remove(position);
        if subscribers.is_empty() {
            state.topics.remove(topic);
        }

        if let Some(meta) = removed.meta {
            let leave = ServerFrame::PresenceLeave {
                key: removed.key,
                metas: vec![meta],
            };
            state.push_all(topic, &leave, None);
            state.push_presence_sync(topic);
        }
    }
}

#[async_trait]
impl ChannelTransport for LocalHub {
    async fn open(&self, topic: &str, key: &str) -> Result<Box<dyn ChannelLink>, ChannelError> {
        let mut state = self.lock();
        if !state.available {
            return Err(ChannelError::Rejected("local hub is unavailable".to_string()));
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        sender
            .send(ServerFrame::Subscribed {
                topic: topic.to_string(),
                key: key.to_string(),
            })
            .map_err(|_| ChannelError::Closed)?;

        let id = state.next_id;
        state.next_id += 1;
        state
            .topics
            .entry(topic.to_string())
            .or_default()
            .push(LocalSubscriber {
                id,
                key: key.to_string(),
                meta: None,
                sender,
            });

        Ok(Box::new(LocalLink {
            hub: self.clone(),
            topic: topic.to_string(),
            id,
            receiver,
            closed: false,
        }))
    }
}

struct LocalLink {
    hub: LocalHub,
    topic: String,
    id: u64,
    receiver: mpsc::UnboundedReceiver<ServerFrame>,
    closed: bool,
}

#[async_trait]
impl ChannelLink for LocalLink {
    fn send(&mut self, frame: ClientFrame) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.hub.dispatch(&self.topic, self.id, frame)
    }

    async fn recv(&mut self) -> Option<ServerFrame> {
        self.receiver.recv().await
    }

    fn try_recv(&mut self) -> Result<ServerFrame, TryRecvError> {
        self.receiver.try_recv()
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.hub.unsubscribe(&self.topic, self.id);
            self.receiver.close();
        }
    }
}

impl Drop for LocalLink {
    fn drop(&mut self) {
        self.close();
    }
}
