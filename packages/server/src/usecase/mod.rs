//! UseCase 層
//!
//! 1 ファイル 1 ユースケース。Repository と MessagePusher の trait にのみ依存します。
//!
//! - リアルタイム中継: `subscribe_topic`, `track_presence`, `relay_broadcast`, `unsubscribe_topic`
//! - ルームディレクトリ: `create_room`, `get_rooms`, `get_room_detail`, `delete_room`
//! - リーダーボード: `submit_result`, `get_leaderboard`
//! - デバッグ: `get_topic_presence`

pub mod create_room;
pub mod delete_room;
pub mod error;
pub mod get_leaderboard;
pub mod get_room_detail;
pub mod get_rooms;
pub mod get_topic_presence;
pub mod relay_broadcast;
pub mod submit_result;
pub mod subscribe_topic;
pub mod track_presence;
pub mod unsubscribe_topic;

pub use create_room::{ALLOWED_WORD_COUNTS, CreateRoomUseCase};
pub use delete_room::DeleteRoomUseCase;
pub use error::{
    CreateRoomError, RelayError, RoomLookupError, SubmitResultError, SubscribeError, TrackError,
};
pub use get_leaderboard::{GetLeaderboardUseCase, MAX_LEADERBOARD_LIMIT};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use get_topic_presence::GetTopicPresenceUseCase;
pub use relay_broadcast::RelayBroadcastUseCase;
pub use submit_result::{SubmitResultUseCase, SubmittedResult};
pub use subscribe_topic::SubscribeTopicUseCase;
pub use track_presence::TrackPresenceUseCase;
pub use unsubscribe_topic::UnsubscribeTopicUseCase;
