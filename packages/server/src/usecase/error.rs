//! UseCase 層のエラー型

use thiserror::Error;

/// トピック購読のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    #[error("Topic '{0}' is full")]
    TopicFull(String),

    #[error("Failed to subscribe: {0}")]
    Repository(String),
}

/// presence 登録のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("Connection is not subscribed: {0}")]
    NotSubscribed(String),

    #[error("Failed to encode frame: {0}")]
    Encode(String),
}

/// ブロードキャスト中継のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Failed to encode frame: {0}")]
    Encode(String),

    #[error("Failed to broadcast frame: {0}")]
    BroadcastFailed(String),
}

/// ルーム作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not allocate a unique room code")]
    CodeExhausted,
}

/// コード指定のルーム操作（取得・削除）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomLookupError {
    #[error("Invalid room code: {0}")]
    InvalidCode(String),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}

/// リーダーボード登録のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitResultError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
