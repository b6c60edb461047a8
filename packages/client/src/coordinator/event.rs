//! Room events exchanged over the channel, and notices raised for the UI.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::state::ChatMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPayload {
    pub username: String,
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRacePayload {
    pub text: String,
    pub started_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRacePayload {
    pub reset_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceProgressPayload {
    pub participant_id: String,
    pub username: String,
    pub progress: i64,
    /// Epoch milliseconds of the sender's finish, once reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<i64>,
}

/// Broadcast events of a room topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomEvent {
    UserJoined(MemberPayload),
    UserLeft(MemberPayload),
    NewMessage(ChatMessage),
    StartRace(StartRacePayload),
    ResetRace(ResetRacePayload),
    RaceProgress(RaceProgressPayload),
}

impl RoomEvent {
    /// Split into the `(event, payload)` pair carried by a broadcast frame
    pub fn into_parts(self) -> serde_json::Result<(String, Value)> {
        let mut value = serde_json::to_value(self)?;
        let event = value
            .get("event")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default();
        let payload = value.get_mut("payload").map(Value::take).unwrap_or(Value::Null);
        Ok((event, payload))
    }

    pub fn from_parts(event: &str, payload: Value) -> serde_json::Result<Self> {
        serde_json::from_value(json!({ "event": event, "payload": payload }))
    }
}

/// Toasts for the front-end, drained with `RoomCoordinator::take_notices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomNotice {
    JoinedRoom { room_name: String },
    LeftRoom,
    PeerJoined { username: String },
    PeerLeft { username: String },
    RaceStarted { by: String },
    RaceReset { by: String },
    ConnectionFailed { room_name: String },
    ConnectionLost { room_name: String },
    MissingUsername,
}

impl fmt::Display for RoomNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomNotice::JoinedRoom { room_name } => write!(f, "Joined room '{}'", room_name),
            RoomNotice::LeftRoom => write!(f, "Left room successfully"),
            RoomNotice::PeerJoined { username } => write!(f, "{} is joined!", username),
            RoomNotice::PeerLeft { username } => write!(f, "{} is left!", username),
            RoomNotice::RaceStarted { by } => write!(f, "Race started by the host ({})", by),
            RoomNotice::RaceReset { by } => write!(f, "Race reset by the host ({})", by),
            RoomNotice::ConnectionFailed { room_name } => {
                write!(f, "Could not connect to '{}'. Try joining again", room_name)
            }
            RoomNotice::ConnectionLost { room_name } => {
                write!(f, "Connection to '{}' lost. Rejoin to continue", room_name)
            }
            RoomNotice::MissingUsername => write!(f, "Set a username before joining a room"),
        }
    }
}
