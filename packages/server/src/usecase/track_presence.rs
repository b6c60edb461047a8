//! UseCase: presence 登録
//!
//! `track` を受け取ったら、トピックの全購読者（本人を含む）に
//! `presence_join` と最新の `presence_sync` を送る。

use std::sync::Arc;

use typefast_shared::protocol::{PresenceMeta, ServerFrame};

use crate::domain::{ConnectionId, MessagePusher, PresenceKey, Topic, TopicRepository};

use super::error::TrackError;

/// presence 登録のユースケース
pub struct TrackPresenceUseCase {
    repository: Arc<dyn TopicRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl TrackPresenceUseCase {
    pub fn new(
        repository: Arc<dyn TopicRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// presence を登録して全購読者に通知する
    ///
    /// 再 track は meta の上書きとして扱い、同じく通知する。
    pub async fn execute(
        &self,
        topic: &Topic,
        connection_id: ConnectionId,
        meta: PresenceMeta,
    ) -> Result<PresenceKey, TrackError> {
        let key = self
            .repository
            .track(topic, connection_id, meta.clone())
            .await
            .map_err(|e| TrackError::NotSubscribed(e.to_string()))?;

        let join = ServerFrame::PresenceJoin {
            key: key.as_str().to_string(),
            metas: vec![meta],
        };
        let sync = ServerFrame::PresenceSync {
            state: self.repository.presence_state(topic).await,
        };
        let join_json =
            serde_json::to_string(&join).map_err(|e| TrackError::Encode(e.to_string()))?;
        let sync_json =
            serde_json::to_string(&sync).map_err(|e| TrackError::Encode(e.to_string()))?;

        let targets = self.repository.connection_ids(topic).await;
        for frame in [join_json, sync_json] {
            if let Err(e) = self.message_pusher.broadcast(targets.clone(), &frame).await {
                tracing::warn!("Failed to broadcast presence on '{}': {}", topic.as_str(), e);
            }
        }

        tracing::info!(
            "Presence '{}' tracked on topic '{}'",
            key.as_str(),
            topic.as_str()
        );
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockMessagePusher, Subscription, Timestamp},
        infrastructure::repository::InMemoryTopicRepository,
    };

    fn meta(username: &str) -> PresenceMeta {
        PresenceMeta {
            online_at: "2023-01-01T00:00:00.000Z".to_string(),
            username: username.to_string(),
            avatar: None,
        }
    }

    async fn subscribe(
        repository: &InMemoryTopicRepository,
        topic: &Topic,
        key: &str,
    ) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        repository
            .subscribe(
                topic,
                Subscription::new(
                    connection_id,
                    PresenceKey::new(key.to_string()).unwrap(),
                    Timestamp::new(0),
                ),
            )
            .await
            .unwrap();
        connection_id
    }

    #[tokio::test]
    async fn test_track_notifies_every_subscriber_including_self() {
        // テスト項目: track すると本人を含む全購読者に join と sync が送られる
        // given (前提条件):
        let repository = Arc::new(InMemoryTopicRepository::new(8));
        let topic = Topic::new("room:r1".to_string()).unwrap();
        let alice = subscribe(&repository, &topic, "alice-key").await;
        let bob = subscribe(&repository, &topic, "bob-key").await;

        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .withf(move |targets, content| {
                targets.len() == 2
                    && targets.contains(&alice)
                    && targets.contains(&bob)
                    && content.contains("alice")
            })
            .times(2)
            .returning(|_, _| Ok(()));
        let usecase = TrackPresenceUseCase::new(repository.clone(), Arc::new(pusher));

        // when (操作):
        let result = usecase.execute(&topic, alice, meta("alice")).await;

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice-key");
        let presence = repository.presence_state(&topic).await;
        assert_eq!(presence.keys().collect::<Vec<_>>(), vec!["alice-key"]);
    }

    #[tokio::test]
    async fn test_track_without_subscription_fails() {
        // テスト項目: 購読していない接続の track はエラーになり、何も送られない
        // given (前提条件):
        let repository = Arc::new(InMemoryTopicRepository::new(8));
        let topic = Topic::new("room:r1".to_string()).unwrap();
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().times(0);
        let usecase = TrackPresenceUseCase::new(repository, Arc::new(pusher));

        // when (操作):
        let result = usecase
            .execute(&topic, ConnectionId::generate(), meta("ghost"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(TrackError::NotSubscribed(_))));
    }
}
