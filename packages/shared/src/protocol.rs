//! Realtime channel wire protocol.
//!
//! One WebSocket connection carries one subscription to a topic
//! (`/ws?topic=room:<id>&key=<presence key>`). Frames are JSON objects tagged
//! by `type`.
//!
//! ```text
//! client                                  server
//!   | ---- GET /ws?topic=..&key=.. ----------> |
//!   | <--- subscribed ------------------------ |
//!   | ---- track {meta} ---------------------> |  presence_join + presence_sync to all
//!   | ---- broadcast {event, payload} -------> |  relayed to every other subscriber
//!   | ---- leave ----------------------------> |  presence_leave + presence_sync to the rest
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Presence metadata announced by a subscriber via `track`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceMeta {
    /// RFC 3339 timestamp of when the subscriber came online
    pub online_at: String,
    pub username: String,
    pub avatar: Option<String>,
}

/// Full presence snapshot of a topic: presence key to its metas.
///
/// A key may hold several metas when the same key is tracked from more than
/// one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceState(pub BTreeMap<String, Vec<PresenceMeta>>);

impl PresenceState {
    /// Build a snapshot from `(key, meta)` pairs of tracked subscribers.
    pub fn from_tracked<'a, I>(tracked: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a PresenceMeta)>,
    {
        let mut state = BTreeMap::<String, Vec<PresenceMeta>>::new();
        for (key, meta) in tracked {
            state.entry(key.to_string()).or_default().push(meta.clone());
        }
        Self(state)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&[PresenceMeta]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Frames sent by a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Announce (or refresh) own presence
    Track { meta: PresenceMeta },
    /// Fire-and-forget message to every other subscriber of the topic
    Broadcast { event: String, payload: Value },
    /// Unsubscribe; the server closes the connection afterwards
    Leave,
}

/// Frames sent by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Subscribed {
        topic: String,
        key: String,
    },
    Rejected {
        reason: String,
    },
    Broadcast {
        event: String,
        payload: Value,
    },
    PresenceSync {
        state: PresenceState,
    },
    PresenceJoin {
        key: String,
        metas: Vec<PresenceMeta>,
    },
    PresenceLeave {
        key: String,
        metas: Vec<PresenceMeta>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(username: &str) -> PresenceMeta {
        PresenceMeta {
            online_at: "2023-01-01T00:00:00.000Z".to_string(),
            username: username.to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_presence_state_groups_metas_by_key() {
        // テスト項目: 同じキーの meta はまとめられ、キー順に並ぶ
        // given (前提条件):
        let bob = meta("bob");
        let alice = meta("alice");
        let alice_again = meta("alice");

        // when (操作):
        let state = PresenceState::from_tracked([
            ("k-bob", &bob),
            ("k-alice", &alice),
            ("k-alice", &alice_again),
        ]);

        // then (期待する結果):
        assert_eq!(state.len(), 2);
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["k-alice", "k-bob"]);
        assert_eq!(state.get("k-alice").map(<[PresenceMeta]>::len), Some(2));
    }

    #[test]
    fn test_client_frame_wire_format() {
        // テスト項目: ClientFrame は type タグ付きの JSON になる
        // given (前提条件):
        let frame = ClientFrame::Broadcast {
            event: "START_RACE".to_string(),
            payload: json!({"text": "the and you"}),
        };

        // when (操作):
        let value = serde_json::to_value(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"type": "broadcast", "event": "START_RACE", "payload": {"text": "the and you"}})
        );
    }

    #[test]
    fn test_server_frame_parses_presence_sync() {
        // テスト項目: presence_sync フレームをパースできる
        // given (前提条件):
        let text = r#"{"type":"presence_sync","state":{"k1":[{"online_at":"2023-01-01T00:00:00.000Z","username":"alice","avatar":null}]}}"#;

        // when (操作):
        let frame: ServerFrame = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        match frame {
            ServerFrame::PresenceSync { state } => {
                assert_eq!(state.get("k1").unwrap()[0].username, "alice");
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_leave_frame_has_no_body() {
        // テスト項目: leave フレームは type のみを持つ
        // given (前提条件):
        let frame = ClientFrame::Leave;

        // when (操作):
        let text = serde_json::to_string(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(text, r#"{"type":"leave"}"#);
    }
}
