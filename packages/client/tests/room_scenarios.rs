//! Multi-client room scenarios over the in-process hub.

use std::sync::Arc;

use typefast_client::{
    channel::{ChannelEvent, LocalHub},
    coordinator::{ProgressSink, RoomCoordinator, RoomNotice, RoomPhase, RoomSession, Role},
    race::{RaceStatus, RaceTyping},
    ui::keystrokes,
};
use typefast_shared::time::{Clock, ManualClock};

fn friday_room() -> RoomSession {
    RoomSession {
        id: "9b1deb4d-3b7d-4bad-9bdd-2b0d7b3dcb6d".to_string(),
        name: "Friday race".to_string(),
        code: "FRI123".to_string(),
    }
}

struct Room {
    hub: LocalHub,
    clock: Arc<ManualClock>,
}

impl Room {
    fn new() -> Self {
        Self {
            hub: LocalHub::new(),
            clock: Arc::new(ManualClock::new(0)),
        }
    }

    async fn join(&self, username: &str, role: Role) -> RoomCoordinator {
        let mut coordinator = RoomCoordinator::new(Arc::new(self.hub.clone()), self.clock.clone());
        assert!(coordinator.join_room(friday_room(), username, role).await);
        coordinator
    }
}

fn settle(clients: &mut [&mut RoomCoordinator]) {
    loop {
        let applied: usize = clients
            .iter_mut()
            .map(|c| c.process_pending_events())
            .sum();
        if applied == 0 {
            break;
        }
    }
}

#[tokio::test]
async fn test_earlier_finisher_ranks_first_everywhere() {
    // テスト項目: A が 10 秒、B が 8 秒で完走すると、全員の画面で B が A より上位
    // given (前提条件):
    let room = Room::new();
    let mut alice = room.join("alice", Role::Host).await;
    let mut bob = room.join("bob", Role::Guest).await;
    settle(&mut [&mut alice, &mut bob]);
    assert!(alice.start_race(true));
    settle(&mut [&mut alice, &mut bob]);

    // when (操作):
    room.clock.set(8_000);
    bob.send_progress(100);
    room.clock.set(10_000);
    alice.send_progress(100);
    settle(&mut [&mut alice, &mut bob]);

    // then (期待する結果):
    for client in [&alice, &bob] {
        let names: Vec<String> = client
            .standings()
            .into_iter()
            .map(|s| s.username)
            .collect();
        assert_eq!(names, vec!["bob".to_string(), "alice".to_string()]);
    }
    let bob_id = bob.participant_id().unwrap().to_string();
    assert_eq!(alice.race().finished_at_of(&bob_id), Some(8_000));
}

#[tokio::test]
async fn test_guest_start_sends_nothing() {
    // テスト項目: ゲストの start_race はブロードキャストを発生させない
    // given (前提条件):
    let room = Room::new();
    let mut host = room.join("host", Role::Host).await;
    let mut guest = room.join("guest", Role::Guest).await;
    settle(&mut [&mut host, &mut guest]);

    // when (操作):
    let started = guest.start_race(true);

    // then (期待する結果):
    assert!(!started);
    assert_eq!(host.process_pending_events(), 0);
    assert_eq!(host.phase(), RoomPhase::Connected);
}

#[tokio::test]
async fn test_leave_and_rejoin_keeps_peer_chat_intact() {
    // テスト項目: 退室して同じルームに再参加しても、相手のチャット履歴は重複せずに残る
    // given (前提条件):
    let room = Room::new();
    let mut alice = room.join("alice", Role::Guest).await;
    let mut bob = room.join("bob", Role::Guest).await;
    settle(&mut [&mut alice, &mut bob]);
    room.clock.set(1_000);
    alice.send_message("hello bob");
    settle(&mut [&mut alice, &mut bob]);
    let first_id = alice.participant_id().unwrap().to_string();
    bob.take_notices();

    // when (操作):
    alice.leave_room();
    assert!(alice.join_room(friday_room(), "alice", Role::Guest).await);
    settle(&mut [&mut alice, &mut bob]);

    // then (期待する結果):
    assert_eq!(bob.messages().len(), 1);
    assert_eq!(bob.messages()[0].content, "hello bob");
    assert!(alice.messages().is_empty());
    assert_eq!(bob.participants().len(), 2);
    assert_ne!(alice.participant_id().unwrap(), first_id);
    assert_eq!(
        bob.take_notices(),
        vec![
            RoomNotice::PeerLeft {
                username: "alice".to_string()
            },
            RoomNotice::PeerJoined {
                username: "alice".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_duplicate_and_late_progress_keep_first_finish() {
    // テスト項目: 重複・遅延した進捗イベントでも最初の完走時刻が保たれる
    // given (前提条件):
    let room = Room::new();
    let mut host = room.join("host", Role::Host).await;
    let mut guest = room.join("guest", Role::Guest).await;
    host.start_race(true);
    settle(&mut [&mut host, &mut guest]);
    let report = |progress: i64, finished_at: Option<i64>| ChannelEvent::Broadcast {
        event: "RACE_PROGRESS".to_string(),
        payload: serde_json::json!({
            "participantId": "ghost",
            "username": "ghost",
            "progress": progress,
            "finishedAt": finished_at,
        }),
    };

    // when (操作):
    guest.handle_event(report(100, Some(5_000)));
    guest.handle_event(report(100, Some(5_000)));
    guest.handle_event(report(100, Some(7_000)));
    guest.handle_event(report(60, None));

    // then (期待する結果):
    assert_eq!(guest.race().finished_at_of("ghost"), Some(5_000));
    assert_eq!(guest.race().progress_of("ghost"), Some(100));
}

#[tokio::test]
async fn test_typing_engine_drives_peer_progress() {
    // テスト項目: タイピングエンジンの進捗がコーディネーター経由で相手に届く
    // given (前提条件):
    let room = Room::new();
    let mut host = room.join("host", Role::Host).await;
    let mut guest = room.join("guest", Role::Guest).await;
    host.start_race(true);
    settle(&mut [&mut host, &mut guest]);
    let text = guest.race().race_text().unwrap().to_string();
    let mut engine = RaceTyping::new(&text);
    let words: Vec<&str> = text.split(' ').collect();

    // when (操作):
    for value in keystrokes(&words[..12].join(" ")) {
        engine.input_to(&value, room.clock.now_millis(), &mut guest);
    }
    settle(&mut [&mut host, &mut guest]);
    let halfway = host.race().progress_of(guest.participant_id().unwrap());
    room.clock.set(30_000);
    for value in keystrokes(&words[12..].join(" ")) {
        engine.input_to(&value, room.clock.now_millis(), &mut guest);
    }
    settle(&mut [&mut host, &mut guest]);

    // then (期待する結果):
    // 12 / 25 words = 48%
    assert_eq!(halfway, Some(48));
    assert_eq!(engine.status(), RaceStatus::Finished);
    let guest_id = guest.participant_id().unwrap();
    assert_eq!(host.race().progress_of(guest_id), Some(100));
    assert_eq!(host.race().finished_at_of(guest_id), Some(30_000));
    assert_eq!(host.standings()[0].username, "guest");
}

#[tokio::test]
async fn test_reset_after_finish_allows_new_race() {
    // テスト項目: リセット後の新しいレースでは完走時刻が再び記録できる
    // given (前提条件):
    let room = Room::new();
    let mut host = room.join("host", Role::Host).await;
    let mut guest = room.join("guest", Role::Guest).await;
    host.start_race(true);
    settle(&mut [&mut host, &mut guest]);
    room.clock.set(4_000);
    guest.send_progress(100);
    settle(&mut [&mut host, &mut guest]);

    // when (操作):
    host.reset_race();
    settle(&mut [&mut host, &mut guest]);
    host.start_race(true);
    settle(&mut [&mut host, &mut guest]);
    room.clock.set(9_000);
    guest.send_progress(100);
    settle(&mut [&mut host, &mut guest]);

    // then (期待する結果):
    let guest_id = guest.participant_id().unwrap();
    assert_eq!(host.race().finished_at_of(guest_id), Some(9_000));
    assert_eq!(guest.phase(), RoomPhase::RaceStarted);
}

#[tokio::test]
async fn test_joining_another_room_leaves_the_first() {
    // テスト項目: 別のルームに参加すると、元のルームからは退室し状態もクリアされる
    // given (前提条件):
    let room = Room::new();
    let mut alice = room.join("alice", Role::Host).await;
    let mut bob = room.join("bob", Role::Guest).await;
    settle(&mut [&mut alice, &mut bob]);
    alice.send_message("see you");
    assert!(alice.start_race(true));
    settle(&mut [&mut alice, &mut bob]);
    bob.take_notices();
    let second = RoomSession {
        id: "2c5ea4c0-4067-11e9-8bad-9b1deb4d3b7d".to_string(),
        name: "Saturday race".to_string(),
        code: "SAT456".to_string(),
    };

    // when (操作):
    assert!(alice.join_room(second.clone(), "alice", Role::Guest).await);
    settle(&mut [&mut alice, &mut bob]);

    // then (期待する結果):
    assert_eq!(room.hub.subscriber_count(&friday_room().topic()), 1);
    assert_eq!(room.hub.subscriber_count(&second.topic()), 1);
    assert_eq!(alice.current_room(), Some(&second));
    assert!(alice.messages().is_empty());
    assert!(!alice.race().is_started());
    assert_eq!(alice.phase(), RoomPhase::Connected);
    assert_eq!(bob.participants().len(), 1);
    assert_eq!(bob.messages().len(), 1);
    assert_eq!(
        bob.take_notices(),
        vec![RoomNotice::PeerLeft {
            username: "alice".to_string()
        }]
    );
}
