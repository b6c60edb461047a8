//! HTTP API bodies for the room directory and the leaderboard.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::{protocol::PresenceState, scoring::Difficulty};

/// Default number of rows returned by `GET /api/leaderboard`.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomMode {
    Time,
    #[default]
    Words,
}

/// `POST /api/rooms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    pub host_id: String,
    #[serde(default)]
    pub mode: RoomMode,
    pub word_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: String,
    pub code: String,
    pub name: String,
    pub host_id: String,
    pub mode: RoomMode,
    pub word_count: u32,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

/// `POST /api/leaderboard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultRequest {
    pub user_id: String,
    pub username: String,
    pub wpm: u32,
    pub accuracy: u32,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryDto {
    pub user_id: String,
    pub username: String,
    pub points: u64,
    pub best_wpm: u32,
    pub last_wpm: u32,
    pub last_accuracy: u32,
    pub difficulty: Difficulty,
    pub updated_at: String,
    /// Only set in the response to a submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_points: Option<u64>,
}

/// `GET /api/leaderboard?limit=n`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// `GET /debug/topics/{topic}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPresenceDto {
    pub topic: String,
    pub presence: PresenceState,
}

/// Body of every 4xx/5xx JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
