//! UseCase: トピック購読
//!
//! WebSocket 接続 1 本につき 1 購読。購読しただけでは presence に現れず、
//! `track` されて初めて他の購読者から見えるようになる。

use std::sync::Arc;

use typefast_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, PresenceKey, PusherChannel, RepositoryError, Subscription,
    Timestamp, Topic, TopicRepository,
};

use super::error::SubscribeError;

/// トピック購読のユースケース
pub struct SubscribeTopicUseCase {
    repository: Arc<dyn TopicRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SubscribeTopicUseCase {
    pub fn new(
        repository: Arc<dyn TopicRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// 購読を登録し、接続 ID を払い出す
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionId)` - 購読成功
    /// * `Err(SubscribeError::TopicFull)` - トピックの購読上限に達している
    pub async fn execute(
        &self,
        topic: &Topic,
        key: PresenceKey,
        sender: PusherChannel,
    ) -> Result<ConnectionId, SubscribeError> {
        let connection_id = ConnectionId::generate();
        let subscription = Subscription::new(
            connection_id,
            key,
            Timestamp::new(self.clock.now_millis()),
        );

        self.repository
            .subscribe(topic, subscription)
            .await
            .map_err(|e| match e {
                RepositoryError::TopicFull(topic) => SubscribeError::TopicFull(topic),
                other => SubscribeError::Repository(other.to_string()),
            })?;

        self.message_pusher
            .register_client(connection_id, sender)
            .await;

        Ok(connection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryTopicRepository,
    };
    use typefast_shared::time::FixedClock;

    fn create_usecase(
        capacity: usize,
    ) -> (
        SubscribeTopicUseCase,
        Arc<InMemoryTopicRepository>,
        Arc<WebSocketMessagePusher>,
    ) {
        let repository = Arc::new(InMemoryTopicRepository::new(capacity));
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SubscribeTopicUseCase::new(
            repository.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(1000)),
        );
        (usecase, repository, pusher)
    }

    fn key(value: &str) -> PresenceKey {
        PresenceKey::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_subscribe_registers_connection() {
        // テスト項目: 購読すると接続がトピックと MessagePusher に登録される
        // given (前提条件):
        let (usecase, repository, pusher) = create_usecase(4);
        let topic = Topic::new("room:r1".to_string()).unwrap();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(&topic, key("alice-key"), tx).await;

        // then (期待する結果):
        let connection_id = result.unwrap();
        assert_eq!(repository.connection_ids(&topic).await, vec![connection_id]);
        assert_eq!(pusher.client_count().await, 1);
        // track 前は presence に現れない
        assert!(repository.presence_state(&topic).await.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_full_topic_fails() {
        // テスト項目: 上限に達したトピックへの購読は TopicFull になり、登録されない
        // given (前提条件):
        let (usecase, _repository, pusher) = create_usecase(1);
        let topic = Topic::new("room:r1".to_string()).unwrap();
        let (tx1, _rx1) = tokio::sync::mpsc::unbounded_channel();
        let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();
        usecase.execute(&topic, key("a"), tx1).await.unwrap();

        // when (操作):
        let result = usecase.execute(&topic, key("b"), tx2).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SubscribeError::TopicFull("room:r1".to_string()))
        );
        assert_eq!(pusher.client_count().await, 1);
    }
}
