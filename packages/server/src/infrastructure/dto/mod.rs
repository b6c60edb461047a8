//! Data Transfer Objects (DTOs)
//!
//! HTTP のボディ型は `typefast_shared::api` に定義され、クライアントと共有されます。
//! ここではドメインエンティティとの変換を提供します。

pub mod conversion;

pub use typefast_shared::api::{
    CreateRoomRequest, ErrorResponse, LeaderboardEntryDto, LeaderboardQuery, RoomDto, RoomMode,
    SubmitResultRequest, TopicPresenceDto,
};
