//! UseCase: トピック購読解除
//!
//! `leave` フレーム受信時と WebSocket 切断時の両方から呼ばれるため冪等。
//! track 済みだった場合は残りの購読者に `presence_leave` と `presence_sync` を送る。

use std::sync::Arc;

use typefast_shared::protocol::{PresenceMeta, ServerFrame};

use crate::domain::{ConnectionId, MessagePusher, Subscription, Topic, TopicRepository};

/// トピック購読解除のユースケース
pub struct UnsubscribeTopicUseCase {
    repository: Arc<dyn TopicRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl UnsubscribeTopicUseCase {
    pub fn new(
        repository: Arc<dyn TopicRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 購読を解除する。既に解除済みなら None
    pub async fn execute(
        &self,
        topic: &Topic,
        connection_id: ConnectionId,
    ) -> Option<Subscription> {
        self.message_pusher.unregister_client(&connection_id).await;

        let removed = self.repository.unsubscribe(topic, connection_id).await?;
        tracing::info!(
            "Connection '{}' unsubscribed from '{}'",
            connection_id,
            topic.as_str()
        );

        if let Some(meta) = removed.meta.clone() {
            self.notify_leave(topic, &removed, meta).await;
        }

        Some(removed)
    }

    async fn notify_leave(
        &self,
        topic: &Topic,
        removed: &Subscription,
        meta: PresenceMeta,
    ) {
        let targets = self.repository.connection_ids(topic).await;
        if targets.is_empty() {
            return;
        }

        let frames = [
            ServerFrame::PresenceLeave {
                key: removed.key.as_str().to_string(),
                metas: vec![meta],
            },
            ServerFrame::PresenceSync {
                state: self.repository.presence_state(topic).await,
            },
        ];
        for frame in frames {
            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!("Failed to encode presence frame: {}", e);
                    continue;
                }
            };
            if let Err(e) = self.message_pusher.broadcast(targets.clone(), &json).await {
                tracing::warn!("Failed to broadcast presence_leave: {}", e);
            }
        }
    }
}
