//! Server state.

use std::sync::Arc;

use typefast_shared::time::{Clock, SystemClock};

use crate::{
    domain::{LeaderboardRepository, MessagePusher, RoomRepository, TopicRepository},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryLeaderboardRepository, InMemoryRoomRepository, InMemoryTopicRepository,
        },
    },
    usecase::{
        CreateRoomUseCase, DeleteRoomUseCase, GetLeaderboardUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, GetTopicPresenceUseCase, RelayBroadcastUseCase, SubmitResultUseCase,
        SubscribeTopicUseCase, TrackPresenceUseCase, UnsubscribeTopicUseCase,
    },
};

/// Shared application state
pub struct AppState {
    // リアルタイム中継
    pub subscribe_topic_usecase: Arc<SubscribeTopicUseCase>,
    pub track_presence_usecase: Arc<TrackPresenceUseCase>,
    pub relay_broadcast_usecase: Arc<RelayBroadcastUseCase>,
    pub unsubscribe_topic_usecase: Arc<UnsubscribeTopicUseCase>,
    pub get_topic_presence_usecase: Arc<GetTopicPresenceUseCase>,
    // ルームディレクトリ
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub delete_room_usecase: Arc<DeleteRoomUseCase>,
    // リーダーボード
    pub submit_result_usecase: Arc<SubmitResultUseCase>,
    pub get_leaderboard_usecase: Arc<GetLeaderboardUseCase>,
}

impl AppState {
    /// Repository と MessagePusher から全ユースケースを組み立てる
    pub fn new(
        topic_repository: Arc<dyn TopicRepository>,
        room_repository: Arc<dyn RoomRepository>,
        leaderboard_repository: Arc<dyn LeaderboardRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscribe_topic_usecase: Arc::new(SubscribeTopicUseCase::new(
                topic_repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            track_presence_usecase: Arc::new(TrackPresenceUseCase::new(
                topic_repository.clone(),
                message_pusher.clone(),
            )),
            relay_broadcast_usecase: Arc::new(RelayBroadcastUseCase::new(
                topic_repository.clone(),
                message_pusher.clone(),
            )),
            unsubscribe_topic_usecase: Arc::new(UnsubscribeTopicUseCase::new(
                topic_repository.clone(),
                message_pusher,
            )),
            get_topic_presence_usecase: Arc::new(GetTopicPresenceUseCase::new(topic_repository)),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                room_repository.clone(),
                clock.clone(),
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(room_repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(room_repository.clone())),
            delete_room_usecase: Arc::new(DeleteRoomUseCase::new(room_repository)),
            submit_result_usecase: Arc::new(SubmitResultUseCase::new(
                leaderboard_repository.clone(),
                clock,
            )),
            get_leaderboard_usecase: Arc::new(GetLeaderboardUseCase::new(leaderboard_repository)),
        }
    }

    /// インメモリ実装とシステム時計で組み立てる
    pub fn in_memory(max_subscribers: usize) -> Self {
        Self::new(
            Arc::new(InMemoryTopicRepository::new(max_subscribers)),
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(InMemoryLeaderboardRepository::new()),
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(SystemClock),
        )
    }
}
