//! InMemory Topic Repository 実装
//!
//! トピック名をキーとした HashMap で購読と presence を保持します。
//! 最後の購読者が抜けたトピックは削除されます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use typefast_shared::protocol::{PresenceMeta, PresenceState};

use crate::domain::{
    ConnectionId, PresenceKey, RepositoryError, Subscription, Topic, TopicRepository, TopicState,
};

/// インメモリ Topic Repository 実装
pub struct InMemoryTopicRepository {
    topics: Arc<Mutex<HashMap<Topic, TopicState>>>,
    /// 1 トピックあたりの購読上限
    max_subscribers: usize,
}

impl InMemoryTopicRepository {
    pub fn new(max_subscribers: usize) -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            max_subscribers,
        }
    }
}

#[async_trait]
impl TopicRepository for InMemoryTopicRepository {
    async fn subscribe(
        &self,
        topic: &Topic,
        subscription: Subscription,
    ) -> Result<(), RepositoryError> {
        let mut topics = self.topics.lock().await;
        topics
            .entry(topic.clone())
            .or_insert_with(|| TopicState::new(topic.clone(), self.max_subscribers))
            .subscribe(subscription)
    }

    async fn track(
        &self,
        topic: &Topic,
        connection_id: ConnectionId,
        meta: PresenceMeta,
    ) -> Result<PresenceKey, RepositoryError> {
        let mut topics = self.topics.lock().await;
        let state = topics
            .get_mut(topic)
            .ok_or_else(|| RepositoryError::SubscriptionNotFound(connection_id.to_string()))?;
        state.track(connection_id, meta)
    }

    async fn unsubscribe(
        &self,
        topic: &Topic,
        connection_id: ConnectionId,
    ) -> Option<Subscription> {
        let mut topics = self.topics.lock().await;
        let state = topics.get_mut(topic)?;
        let removed = state.unsubscribe(connection_id);
        if state.is_empty() {
            topics.remove(topic);
            tracing::debug!("Topic '{}' dropped (no subscribers left)", topic.as_str());
        }
        removed
    }

    async fn connection_ids(&self, topic: &Topic) -> Vec<ConnectionId> {
        let topics = self.topics.lock().await;
        topics
            .get(topic)
            .map(TopicState::connection_ids)
            .unwrap_or_default()
    }

    async fn presence_state(&self, topic: &Topic) -> PresenceState {
        let topics = self.topics.lock().await;
        topics
            .get(topic)
            .map(TopicState::presence_state)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;

    fn topic(name: &str) -> Topic {
        Topic::new(name.to_string()).unwrap()
    }

    fn subscription(key: &str) -> Subscription {
        Subscription::new(
            ConnectionId::generate(),
            PresenceKey::new(key.to_string()).unwrap(),
            Timestamp::new(0),
        )
    }

    fn meta(username: &str) -> PresenceMeta {
        PresenceMeta {
            online_at: "2023-01-01T00:00:00.000Z".to_string(),
            username: username.to_string(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        // テスト項目: 別トピックの購読者は互いに見えない
        // given (前提条件):
        let repo = InMemoryTopicRepository::new(8);
        let r1 = topic("room:r1");
        let r2 = topic("room:r2");

        // when (操作):
        repo.subscribe(&r1, subscription("a")).await.unwrap();
        repo.subscribe(&r2, subscription("b")).await.unwrap();
        repo.subscribe(&r2, subscription("c")).await.unwrap();

        // then (期待する結果):
        assert_eq!(repo.connection_ids(&r1).await.len(), 1);
        assert_eq!(repo.connection_ids(&r2).await.len(), 2);
    }

    #[tokio::test]
    async fn test_track_then_presence_state() {
        // テスト項目: track した購読者が presence に現れる
        // given (前提条件):
        let repo = InMemoryTopicRepository::new(8);
        let r1 = topic("room:r1");
        let sub = subscription("alice-key");
        let conn = sub.connection_id;
        repo.subscribe(&r1, sub).await.unwrap();

        // when (操作):
        let key = repo.track(&r1, conn, meta("alice")).await.unwrap();
        let presence = repo.presence_state(&r1).await;

        // then (期待する結果):
        assert_eq!(key.as_str(), "alice-key");
        assert_eq!(presence.get("alice-key").unwrap()[0].username, "alice");
    }

    #[tokio::test]
    async fn test_last_unsubscribe_drops_topic() {
        // テスト項目: 最後の購読者が抜けるとトピックが消え、再購読で上限がリセットされる
        // given (前提条件):
        let repo = InMemoryTopicRepository::new(1);
        let r1 = topic("room:r1");
        let sub = subscription("a");
        let conn = sub.connection_id;
        repo.subscribe(&r1, sub).await.unwrap();

        // when (操作):
        let removed = repo.unsubscribe(&r1, conn).await;
        let resubscribe = repo.subscribe(&r1, subscription("b")).await;

        // then (期待する結果):
        assert!(removed.is_some());
        assert!(resubscribe.is_ok());
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_topic_is_none() {
        // テスト項目: 存在しないトピックからの購読解除は None（冪等）
        // given (前提条件):
        let repo = InMemoryTopicRepository::new(8);

        // when (操作):
        let removed = repo
            .unsubscribe(&topic("room:none"), ConnectionId::generate())
            .await;

        // then (期待する結果):
        assert!(removed.is_none());
    }
}
