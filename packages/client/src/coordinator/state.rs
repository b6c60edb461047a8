//! Client-held room state: session, participants, chat log and race.

use std::collections::HashMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use typefast_shared::protocol::PresenceState;

/// The room this client is in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSession {
    pub id: String,
    pub name: String,
    pub code: String,
}

impl RoomSession {
    /// Realtime topic of the room
    pub fn topic(&self) -> String {
        format!("room:{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Host,
    #[default]
    Guest,
}

/// Someone currently present in the room, derived from presence snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Presence key (participant id of that join)
    pub id: String,
    pub username: String,
    pub online_at: String,
    pub avatar: Option<String>,
}

/// Participants of a presence snapshot, oldest first
pub fn participants_from(state: &PresenceState) -> Vec<Participant> {
    let mut participants: Vec<Participant> = state
        .0
        .iter()
        .filter_map(|(key, metas)| {
            metas.first().map(|meta| Participant {
                id: key.clone(),
                username: meta.username.clone(),
                online_at: meta.online_at.clone(),
                avatar: meta.avatar.clone(),
            })
        })
        .collect();
    participants.sort_by(|a, b| {
        a.online_at
            .cmp(&b.online_at)
            .then_with(|| a.username.cmp(&b.username))
    });
    participants
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub user: ChatUser,
    /// ISO-8601 timestamp
    pub created_at: String,
}

impl ChatMessage {
    fn created_at_millis(&self) -> Option<i64> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.timestamp_millis())
    }
}

/// Chat history of the current session, ordered by `createdAt`
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// Insert a message unless its id is already present.
    ///
    /// Messages are ordered by the instant they were written, so a late
    /// remote message lands before newer local ones. Messages whose
    /// timestamp cannot be parsed go after every dated message.
    pub fn merge(&mut self, message: ChatMessage) -> bool {
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        let key = sort_key(&message);
        let position = self.messages.partition_point(|m| sort_key(m) <= key);
        self.messages.insert(position, message);
        true
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Instant, then id, so every peer orders the log the same way
fn sort_key(message: &ChatMessage) -> (bool, i64, &str) {
    match message.created_at_millis() {
        Some(millis) => (false, millis, &message.id),
        None => (true, 0, &message.id),
    }
}

/// Race lifecycle of the room
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceState {
    is_started: bool,
    race_text: Option<String>,
    progress: HashMap<String, u8>,
    finished_at: HashMap<String, i64>,
    usernames: HashMap<String, String>,
}

impl RaceState {
    pub fn is_started(&self) -> bool {
        self.is_started
    }

    pub fn race_text(&self) -> Option<&str> {
        self.race_text.as_deref()
    }

    pub fn progress_of(&self, participant_id: &str) -> Option<u8> {
        self.progress.get(participant_id).copied()
    }

    pub fn finished_at_of(&self, participant_id: &str) -> Option<i64> {
        self.finished_at.get(participant_id).copied()
    }

    /// Participant ids with a progress entry, with the username last reported
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.progress
            .keys()
            .map(|id| (id.as_str(), self.usernames.get(id).map(String::as_str)))
    }

    /// Begin a race on `text`, forgetting every previous entry
    pub fn start(&mut self, text: String) {
        self.is_started = true;
        self.race_text = Some(text);
        self.progress.clear();
        self.finished_at.clear();
        self.usernames.clear();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a progress report and return the stored value.
    ///
    /// Progress is clamped to `0..=100`. The first report reaching 100 fixes
    /// the finish time to `finished_at`; later reports never move it, and a
    /// finished participant stays at 100.
    pub fn apply_progress(
        &mut self,
        participant_id: &str,
        username: &str,
        progress: i64,
        finished_at: i64,
    ) -> u8 {
        let clamped = progress.clamp(0, 100) as u8;
        let stored = if self.finished_at.contains_key(participant_id) {
            100
        } else {
            if clamped == 100 {
                self.finished_at
                    .insert(participant_id.to_string(), finished_at);
            }
            clamped
        };
        self.progress.insert(participant_id.to_string(), stored);
        self.usernames
            .insert(participant_id.to_string(), username.to_string());
        stored
    }
}
