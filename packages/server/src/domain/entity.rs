//! Entity 定義
//!
//! - `TopicState`: 1 トピック分の購読者と presence
//! - `Room`: ルームディレクトリに登録されたルーム
//! - `LeaderboardEntry`: ユーザーごとのリーダーボード集計

use serde::{Deserialize, Serialize};
use typefast_shared::{
    protocol::{PresenceMeta, PresenceState},
    scoring::{Difficulty, ScoreTotals},
};
use uuid::Uuid;

use super::{
    error::RepositoryError,
    value_object::{ConnectionId, PresenceKey, RoomCode, RoomName, Timestamp, Topic, UserId},
};

/// トピックへの 1 接続分の購読
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub connection_id: ConnectionId,
    pub key: PresenceKey,
    /// `track` されるまでは None（presence に現れない）
    pub meta: Option<PresenceMeta>,
    pub subscribed_at: Timestamp,
}

impl Subscription {
    pub fn new(connection_id: ConnectionId, key: PresenceKey, subscribed_at: Timestamp) -> Self {
        Self {
            connection_id,
            key,
            meta: None,
            subscribed_at,
        }
    }
}

/// 1 トピックの購読状態
#[derive(Debug, Clone)]
pub struct TopicState {
    pub topic: Topic,
    /// 購読順
    pub subscriptions: Vec<Subscription>,
    capacity: usize,
}

impl TopicState {
    pub fn new(topic: Topic, capacity: usize) -> Self {
        Self {
            topic,
            subscriptions: Vec::new(),
            capacity,
        }
    }

    pub fn subscribe(&mut self, subscription: Subscription) -> Result<(), RepositoryError> {
        if self.subscriptions.len() >= self.capacity {
            return Err(RepositoryError::TopicFull(self.topic.as_str().to_string()));
        }
        self.subscriptions.push(subscription);
        Ok(())
    }

    /// presence を登録（再 track は上書き）し、その購読のキーを返す
    pub fn track(
        &mut self,
        connection_id: ConnectionId,
        meta: PresenceMeta,
    ) -> Result<PresenceKey, RepositoryError> {
        let subscription = self
            .subscriptions
            .iter_mut()
            .find(|s| s.connection_id == connection_id)
            .ok_or_else(|| RepositoryError::SubscriptionNotFound(connection_id.to_string()))?;
        subscription.meta = Some(meta);
        Ok(subscription.key.clone())
    }

    pub fn unsubscribe(&mut self, connection_id: ConnectionId) -> Option<Subscription> {
        let position = self
            .subscriptions
            .iter()
            .position(|s| s.connection_id == connection_id)?;
        Some(self.subscriptions.remove(position))
    }

    /// track 済みの購読者から presence のスナップショットを作る
    pub fn presence_state(&self) -> PresenceState {
        PresenceState::from_tracked(
            self.subscriptions
                .iter()
                .filter_map(|s| s.meta.as_ref().map(|meta| (s.key.as_str(), meta))),
        )
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.subscriptions.iter().map(|s| s.connection_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

/// ゲームモード（時間制限 or 単語数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Words,
    Time,
}

/// ルームディレクトリのルーム
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub id: Uuid,
    pub code: RoomCode,
    pub name: RoomName,
    pub host_id: UserId,
    pub mode: GameMode,
    pub word_count: u32,
    pub created_at: Timestamp,
}

/// リーダーボードの 1 ユーザー分
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub username: String,
    pub totals: ScoreTotals,
    pub last_wpm: u32,
    pub last_accuracy: u32,
    pub difficulty: Difficulty,
    pub updated_at: Timestamp,
}

impl LeaderboardEntry {
    pub fn new(user_id: UserId, username: String, now: Timestamp) -> Self {
        Self {
            user_id,
            username,
            totals: ScoreTotals::default(),
            last_wpm: 0,
            last_accuracy: 0,
            difficulty: Difficulty::default(),
            updated_at: now,
        }
    }

    /// セッション結果を集計に反映し、獲得ポイントを返す
    pub fn record(
        &mut self,
        wpm: u32,
        accuracy: u32,
        difficulty: Difficulty,
        now: Timestamp,
    ) -> u64 {
        let earned = self.totals.record(wpm, accuracy, difficulty);
        self.last_wpm = wpm;
        self.last_accuracy = accuracy;
        self.difficulty = difficulty;
        self.updated_at = now;
        earned
    }
}
