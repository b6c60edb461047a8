//! UseCase: ブロードキャスト中継
//!
//! 送信者以外の全購読者にイベントを届ける（自分自身にはエコーしない）。
//! 配送確認も再送もしない。

use std::sync::Arc;

use serde_json::Value;
use typefast_shared::protocol::ServerFrame;

use crate::domain::{ConnectionId, MessagePusher, Topic, TopicRepository};

use super::error::RelayError;

/// ブロードキャスト中継のユースケース
pub struct RelayBroadcastUseCase {
    repository: Arc<dyn TopicRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayBroadcastUseCase {
    pub fn new(
        repository: Arc<dyn TopicRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// イベントを中継し、配送対象の接続 ID を返す
    pub async fn execute(
        &self,
        topic: &Topic,
        from: ConnectionId,
        event: String,
        payload: Value,
    ) -> Result<Vec<ConnectionId>, RelayError> {
        let frame = ServerFrame::Broadcast { event, payload };
        let json = serde_json::to_string(&frame).map_err(|e| RelayError::Encode(e.to_string()))?;

        let targets = self.broadcast_targets(topic, &from).await;
        self.message_pusher
            .broadcast(targets.clone(), &json)
            .await
            .map_err(|e| RelayError::BroadcastFailed(e.to_string()))?;

        Ok(targets)
    }

    /// 送信者本人にだけフレームを返す（不正なフレームへの `rejected` など）
    pub async fn reply(&self, to: ConnectionId, frame: &ServerFrame) -> Result<(), RelayError> {
        let json = serde_json::to_string(frame).map_err(|e| RelayError::Encode(e.to_string()))?;
        self.message_pusher
            .push_to(&to, &json)
            .await
            .map_err(|e| RelayError::BroadcastFailed(e.to_string()))
    }

    async fn broadcast_targets(&self, topic: &Topic, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.repository
            .connection_ids(topic)
            .await
            .into_iter()
            .filter(|id| id != exclude)
            .collect()
    }
}
