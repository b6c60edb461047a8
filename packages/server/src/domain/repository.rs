//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use typefast_shared::{
    protocol::{PresenceMeta, PresenceState},
    scoring::Difficulty,
};

use super::{
    ConnectionId, LeaderboardEntry, PresenceKey, RepositoryError, Room, RoomCode, Subscription,
    Timestamp, Topic, UserId,
};

/// トピック購読と presence の保存先
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// 購読を追加（トピックが無ければ作成）
    async fn subscribe(
        &self,
        topic: &Topic,
        subscription: Subscription,
    ) -> Result<(), RepositoryError>;

    /// presence を登録し、その購読のキーを返す
    async fn track(
        &self,
        topic: &Topic,
        connection_id: ConnectionId,
        meta: PresenceMeta,
    ) -> Result<PresenceKey, RepositoryError>;

    /// 購読を削除（空になったトピックも削除）。未購読なら None
    async fn unsubscribe(
        &self,
        topic: &Topic,
        connection_id: ConnectionId,
    ) -> Option<Subscription>;

    /// 購読中の全ての接続 ID
    async fn connection_ids(&self, topic: &Topic) -> Vec<ConnectionId>;

    /// presence のスナップショット
    async fn presence_state(&self, topic: &Topic) -> PresenceState;
}

/// ルームディレクトリ（コードで引けるルーム）の保存先
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn insert(&self, room: Room) -> Result<(), RepositoryError>;

    async fn find_by_code(&self, code: &RoomCode) -> Option<Room>;

    /// 作成日時順
    async fn list(&self) -> Vec<Room>;

    async fn delete_by_code(&self, code: &RoomCode) -> Result<Room, RepositoryError>;
}

/// リーダーボードの保存先
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    async fn find(&self, user_id: &UserId) -> Option<LeaderboardEntry>;

    async fn save(&self, entry: LeaderboardEntry);

    /// エントリの取得（なければ作成）・集計・保存を 1 ステップで行い、
    /// 更新後のエントリと獲得ポイントを返す
    async fn record(
        &self,
        user_id: UserId,
        username: String,
        wpm: u32,
        accuracy: u32,
        difficulty: Difficulty,
        now: Timestamp,
    ) -> (LeaderboardEntry, u64);

    /// ポイントの降順
    async fn top(&self, limit: usize) -> Vec<LeaderboardEntry>;
}
