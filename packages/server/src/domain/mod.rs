//! ドメイン層
//!
//! トピック購読・presence・ルームディレクトリ・リーダーボードのモデルと、
//! それらを扱うための port（trait）を定義します。

pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{GameMode, LeaderboardEntry, Room, Subscription, TopicState};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::{LeaderboardRepository, RoomRepository, TopicRepository};
pub use value_object::{
    ConnectionId, PresenceKey, RoomCode, RoomCodeFactory, RoomName, Timestamp, Topic, UserId,
};

#[cfg(test)]
pub use pusher::MockMessagePusher;
