//! Room coordinator: membership, chat and race state of the current room.
//!
//! The coordinator is owned by the front-end controller and driven one event
//! at a time: user actions are method calls, channel events are applied with
//! [`RoomCoordinator::process_next_event`] or
//! [`RoomCoordinator::process_pending_events`]. Every action is applied
//! locally first, then broadcast; the relay never echoes to the sender.
//!
//! ```text
//! Disconnected --join--> Connecting --subscribed--> Connected --START_RACE--> RaceStarted
//!      ^                     |                          ^                          |
//!      |                  (failed)                      +-------RESET_RACE---------+
//!      +-------leave / connection lost------------------+
//! ```

mod event;
mod ranking;
mod state;

pub use event::{
    MemberPayload, RaceProgressPayload, ResetRacePayload, RoomEvent, RoomNotice,
    StartRacePayload,
};
pub use ranking::{Standing, compare_standings, rank};
pub use state::{
    ChatLog, ChatMessage, ChatUser, Participant, RaceState, Role, RoomSession, participants_from,
};

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use typefast_shared::{
    protocol::PresenceMeta,
    time::{Clock, millis_to_rfc3339},
};
use uuid::Uuid;

use crate::{
    channel::{ChannelEvent, ChannelTransport, RoomChannel},
    words::generate_race_text,
};

/// Receiver of race progress produced by the typing engine
pub trait ProgressSink {
    fn send_progress(&mut self, progress: i64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    Disconnected,
    Connecting,
    Connected,
    RaceStarted,
}

pub struct RoomCoordinator {
    transport: Arc<dyn ChannelTransport>,
    clock: Arc<dyn Clock>,
    username: String,
    role: Role,
    participant_id: Option<String>,
    session: Option<RoomSession>,
    channel: Option<RoomChannel>,
    phase: RoomPhase,
    participants: Vec<Participant>,
    chat: ChatLog,
    race: RaceState,
    notices: VecDeque<RoomNotice>,
}

impl RoomCoordinator {
    pub fn new(transport: Arc<dyn ChannelTransport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            clock,
            username: String::new(),
            role: Role::default(),
            participant_id: None,
            session: None,
            channel: None,
            phase: RoomPhase::Disconnected,
            participants: Vec::new(),
            chat: ChatLog::default(),
            race: RaceState::default(),
            notices: VecDeque::new(),
        }
    }

    /// Join `room` as `username`, leaving the current room first.
    ///
    /// Returns whether the subscription succeeded. On failure the room is
    /// kept so the front-end can offer [`RoomCoordinator::rejoin`].
    pub async fn join_room(&mut self, room: RoomSession, username: &str, role: Role) -> bool {
        let username = username.trim();
        if username.is_empty() {
            tracing::warn!("Join of '{}' refused: no username", room.code);
            self.notices.push_back(RoomNotice::MissingUsername);
            return false;
        }
        if self.is_connected() {
            self.leave_room();
        } else {
            // Nothing left to tell after a failed or lost connection
            self.close_session();
        }

        let participant_id = Uuid::new_v4().to_string();
        tracing::info!(
            "Joining room '{}' ({}) as '{}' [{}]",
            room.name,
            room.code,
            username,
            participant_id
        );
        self.phase = RoomPhase::Connecting;
        self.username = username.to_string();
        self.role = role;

        let channel =
            RoomChannel::connect(self.transport.as_ref(), &room.topic(), &participant_id).await;
        if !channel.is_connected() {
            self.notices.push_back(RoomNotice::ConnectionFailed {
                room_name: room.name.clone(),
            });
            self.session = Some(room);
            self.phase = RoomPhase::Disconnected;
            return false;
        }

        self.channel = Some(channel);
        self.participant_id = Some(participant_id);
        self.phase = RoomPhase::Connected;

        let online_at = millis_to_rfc3339(self.clock.now_millis());
        if let Some(channel) = self.channel.as_mut() {
            channel.track_presence(PresenceMeta {
                online_at,
                username: self.username.clone(),
                avatar: None,
            });
        }
        self.publish(RoomEvent::UserJoined(MemberPayload {
            username: self.username.clone(),
            room_id: room.id.clone(),
        }));
        self.notices.push_back(RoomNotice::JoinedRoom {
            room_name: room.name.clone(),
        });
        self.session = Some(room);
        true
    }

    /// Join the current room again after a failed or lost connection
    pub async fn rejoin(&mut self) -> bool {
        let Some(room) = self.session.clone() else {
            return false;
        };
        if self.is_connected() {
            return true;
        }
        let username = self.username.clone();
        self.join_room(room, &username, self.role).await
    }

    /// Leave the current room. Does nothing when not in a room.
    pub fn leave_room(&mut self) {
        if self.close_session() {
            self.notices.push_back(RoomNotice::LeftRoom);
        }
    }

    /// Unsubscribe and clear all room state. Returns whether a room was held.
    fn close_session(&mut self) -> bool {
        let Some(room) = self.session.take() else {
            return false;
        };
        tracing::info!("Leaving room '{}' ({})", room.name, room.code);

        if self.is_connected() {
            self.publish(RoomEvent::UserLeft(MemberPayload {
                username: self.username.clone(),
                room_id: room.id.clone(),
            }));
        }
        if let Some(mut channel) = self.channel.take() {
            channel.disconnect();
        }

        self.participant_id = None;
        self.participants.clear();
        self.chat.clear();
        self.race.reset();
        self.phase = RoomPhase::Disconnected;
        true
    }

    /// Append a chat message locally and broadcast it
    pub fn send_message(&mut self, content: &str) -> Option<ChatMessage> {
        let content = content.trim();
        if content.is_empty() || self.session.is_none() {
            return None;
        }
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            user: ChatUser {
                name: self.username.clone(),
            },
            created_at: millis_to_rfc3339(self.clock.now_millis()),
        };
        self.chat.merge(message.clone());
        self.publish(RoomEvent::NewMessage(message.clone()));
        Some(message)
    }

    /// Start a race on a fresh text. Host only, and only once confirmed.
    pub fn start_race(&mut self, confirm: bool) -> bool {
        if !confirm || !self.is_host() || !self.is_connected() {
            tracing::debug!("start_race ignored (confirm: {}, role: {:?})", confirm, self.role);
            return false;
        }
        let text = generate_race_text(&mut rand::thread_rng());
        tracing::info!("Starting race ({} words)", text.split(' ').count());
        self.race.start(text.clone());
        self.phase = RoomPhase::RaceStarted;
        self.publish(RoomEvent::StartRace(StartRacePayload {
            text,
            started_by: self.username.clone(),
        }));
        true
    }

    /// Clear the race for everyone. Host only.
    pub fn reset_race(&mut self) -> bool {
        if !self.is_host() || !self.is_connected() {
            tracing::debug!("reset_race ignored (role: {:?})", self.role);
            return false;
        }
        tracing::info!("Resetting race");
        self.race.reset();
        self.phase = RoomPhase::Connected;
        self.publish(RoomEvent::ResetRace(ResetRacePayload {
            reset_by: self.username.clone(),
        }));
        true
    }

    /// Wait for the next channel event and apply it.
    ///
    /// Returns `false` when there is no connected channel to wait on.
    pub async fn process_next_event(&mut self) -> bool {
        let Some(channel) = self.channel.as_mut() else {
            return false;
        };
        match channel.next_event().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply every event already delivered, returning how many were applied
    pub fn process_pending_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.channel.as_mut().and_then(RoomChannel::try_next_event) {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    pub fn handle_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Broadcast { event, payload } => {
                match RoomEvent::from_parts(&event, payload) {
                    Ok(room_event) => self.apply_room_event(room_event),
                    Err(e) => tracing::debug!("Ignoring broadcast '{}': {}", event, e),
                }
            }
            ChannelEvent::PresenceSync(state) => {
                self.participants = participants_from(&state);
                tracing::debug!("Presence sync: {} participant(s)", self.participants.len());
            }
            ChannelEvent::PresenceJoin { .. } | ChannelEvent::PresenceLeave { .. } => {
                if let Some(channel) = self.channel.as_ref() {
                    self.participants = participants_from(channel.presence_state());
                }
            }
            ChannelEvent::Closed => {
                self.channel = None;
                self.participants.clear();
                self.phase = RoomPhase::Disconnected;
                if let Some(room) = self.session.as_ref() {
                    self.notices.push_back(RoomNotice::ConnectionLost {
                        room_name: room.name.clone(),
                    });
                }
            }
        }
    }

    fn apply_room_event(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::UserJoined(member) => {
                self.notices.push_back(RoomNotice::PeerJoined {
                    username: member.username,
                });
            }
            RoomEvent::UserLeft(member) => {
                self.notices.push_back(RoomNotice::PeerLeft {
                    username: member.username,
                });
            }
            RoomEvent::NewMessage(message) => {
                if !self.chat.merge(message) {
                    tracing::debug!("Duplicate chat message ignored");
                }
            }
            RoomEvent::StartRace(start) => {
                tracing::info!("Race started by '{}'", start.started_by);
                self.race.start(start.text);
                self.phase = RoomPhase::RaceStarted;
                self.notices
                    .push_back(RoomNotice::RaceStarted { by: start.started_by });
            }
            RoomEvent::ResetRace(reset) => {
                tracing::info!("Race reset by '{}'", reset.reset_by);
                self.race.reset();
                self.phase = RoomPhase::Connected;
                self.notices
                    .push_back(RoomNotice::RaceReset { by: reset.reset_by });
            }
            RoomEvent::RaceProgress(report) => {
                if !self.race.is_started() {
                    tracing::debug!("Progress of '{}' outside a race ignored", report.username);
                    return;
                }
                let finished_at = report
                    .finished_at
                    .unwrap_or_else(|| self.clock.now_millis());
                self.race.apply_progress(
                    &report.participant_id,
                    &report.username,
                    report.progress,
                    finished_at,
                );
            }
        }
    }

    fn publish(&mut self, event: RoomEvent) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };
        match event.into_parts() {
            Ok((name, payload)) => channel.broadcast(&name, payload),
            Err(e) => tracing::warn!("Failed to encode room event: {}", e),
        }
    }

    /// Race ranking over present participants and everyone who reported progress
    pub fn standings(&self) -> Vec<Standing> {
        let mut rows: HashMap<String, Standing> = HashMap::new();
        for participant in &self.participants {
            rows.insert(
                participant.id.clone(),
                Standing {
                    participant_id: participant.id.clone(),
                    username: participant.username.clone(),
                    progress: self.race.progress_of(&participant.id).unwrap_or(0),
                    finished_at: self.race.finished_at_of(&participant.id),
                },
            );
        }
        for (id, username) in self.race.entries() {
            rows.entry(id.to_string()).or_insert_with(|| Standing {
                participant_id: id.to_string(),
                username: username.unwrap_or(id).to_string(),
                progress: self.race.progress_of(id).unwrap_or(0),
                finished_at: self.race.finished_at_of(id),
            });
        }
        rank(rows.into_values().collect())
    }

    pub fn take_notices(&mut self) -> Vec<RoomNotice> {
        self.notices.drain(..).collect()
    }

    pub fn is_connected(&self) -> bool {
        self.channel.as_ref().is_some_and(RoomChannel::is_connected)
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    pub fn current_room(&self) -> Option<&RoomSession> {
        self.session.as_ref()
    }

    pub fn participant_id(&self) -> Option<&str> {
        self.participant_id.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.chat.messages()
    }

    pub fn race(&self) -> &RaceState {
        &self.race
    }
}

impl ProgressSink for RoomCoordinator {
    /// Record own progress and broadcast it.
    ///
    /// Ignored outside a running race.
    fn send_progress(&mut self, progress: i64) {
        if !self.race.is_started() {
            return;
        }
        let Some(participant_id) = self.participant_id.clone() else {
            return;
        };
        let now = self.clock.now_millis();
        let stored = self
            .race
            .apply_progress(&participant_id, &self.username, progress, now);
        let finished_at = self.race.finished_at_of(&participant_id);
        self.publish(RoomEvent::RaceProgress(RaceProgressPayload {
            participant_id,
            username: self.username.clone(),
            progress: i64::from(stored),
            finished_at,
        }));
    }
}
