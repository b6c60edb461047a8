//! Client against an in-process `typefast-server`.

use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use typefast_client::{
    api::{HttpApi, LeaderboardBridge, RoomDirectory},
    channel::{RoomChannel, WebSocketTransport},
    coordinator::{ProgressSink, RoomCoordinator, RoomNotice, RoomPhase, RoomSession, Role},
    error::RoomDirectoryError,
};
use typefast_server::ui::{AppState, Server};
use typefast_shared::{
    api::{CreateRoomRequest, RoomMode},
    scoring::Difficulty,
    time::SystemClock,
};

async fn spawn_server(max_subscribers: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new(AppState::in_memory(max_subscribers));
    tokio::spawn(async move {
        server.serve(listener).await.ok();
    });
    format!("http://{}", addr)
}

fn coordinator(server_url: &str) -> RoomCoordinator {
    RoomCoordinator::new(
        Arc::new(WebSocketTransport::new(server_url)),
        Arc::new(SystemClock),
    )
}

/// Apply events until `done` holds, failing after five seconds
async fn pump_until<F>(coordinator: &mut RoomCoordinator, mut done: F)
where
    F: FnMut(&RoomCoordinator) -> bool,
{
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !done(coordinator) {
            if !coordinator.process_next_event().await {
                break;
            }
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for room events");
    assert!(done(coordinator));
}

fn create_request(name: &str) -> CreateRoomRequest {
    CreateRoomRequest {
        name: name.to_string(),
        host_id: "host-user".to_string(),
        mode: RoomMode::Words,
        word_count: 25,
    }
}

#[tokio::test]
async fn test_room_directory_round_trip() {
    // テスト項目: ルームの作成・コード検索・一覧・削除が HTTP 経由で行える
    // given (前提条件):
    let server_url = spawn_server(8).await;
    let api = HttpApi::new(&server_url);

    // when (操作):
    let created = api.create_room(create_request("Lunch race")).await.unwrap();
    let found = api
        .find_room_by_code(&created.code.to_lowercase())
        .await
        .unwrap();
    let listed = api.list_rooms().await.unwrap();
    api.delete_room_by_code(&created.code).await.unwrap();
    let after_delete = api.find_room_by_code(&created.code).await;

    // then (期待する結果):
    assert_eq!(found, created);
    assert_eq!(created.code.len(), 6);
    assert!(listed.iter().any(|room| room.id == created.id));
    assert!(matches!(
        after_delete,
        Err(RoomDirectoryError::RoomNotFound(_))
    ));
}

#[tokio::test]
async fn test_leaderboard_accumulates_points() {
    // テスト項目: 結果の送信ごとにポイントが加算され、最高 WPM が保たれる
    // given (前提条件):
    let server_url = spawn_server(8).await;
    let api = HttpApi::new(&server_url);

    // when (操作):
    let first = api
        .upsert_entry("u1", "alice", 60, 90, Difficulty::Medium)
        .await
        .unwrap();
    let second = api
        .upsert_entry("u1", "alice", 50, 100, Difficulty::Easy)
        .await
        .unwrap();
    api.upsert_entry("u2", "bob", 40, 100, Difficulty::Easy)
        .await
        .unwrap();
    let top = api.top_entries(10).await.unwrap();

    // then (期待する結果):
    // floor(60 * 1.5 * 0.9) = 81
    assert_eq!(first.earned_points, Some(81));
    assert_eq!(second.earned_points, Some(50));
    assert_eq!(second.points, 131);
    assert_eq!(second.best_wpm, 60);
    let names: Vec<&str> = top.iter().map(|e| e.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_race_over_websocket_relay() {
    // テスト項目: 実サーバー経由でホストが開始したレースの進捗と完走が相手に届く
    // given (前提条件):
    let server_url = spawn_server(8).await;
    let api = HttpApi::new(&server_url);
    let room = api.create_room(create_request("Relay race")).await.unwrap();
    let session = RoomSession::from(&room);
    let mut host = coordinator(&server_url);
    let mut guest = coordinator(&server_url);
    assert!(host.join_room(session.clone(), "alice", Role::Host).await);
    assert!(guest.join_room(session, "bob", Role::Guest).await);
    pump_until(&mut host, |c| c.participants().len() == 2).await;
    pump_until(&mut guest, |c| c.participants().len() == 2).await;

    // when (操作):
    assert!(host.start_race(true));
    pump_until(&mut guest, |c| c.race().is_started()).await;
    guest.send_progress(40);
    guest.send_progress(100);
    let guest_id = guest.participant_id().unwrap().to_string();
    pump_until(&mut host, |c| c.race().finished_at_of(&guest_id).is_some()).await;

    // then (期待する結果):
    assert_eq!(guest.phase(), RoomPhase::RaceStarted);
    assert_eq!(guest.race().race_text(), host.race().race_text());
    assert_eq!(
        host.race().finished_at_of(&guest_id),
        guest.race().finished_at_of(&guest_id)
    );
    assert_eq!(host.standings()[0].username, "bob");
    assert!(host.take_notices().contains(&RoomNotice::PeerJoined {
        username: "bob".to_string()
    }));
}

#[tokio::test]
async fn test_chat_and_leave_over_websocket_relay() {
    // テスト項目: チャットが相手に届き、退室すると相手の参加者一覧から消える
    // given (前提条件):
    let server_url = spawn_server(8).await;
    let api = HttpApi::new(&server_url);
    let room = api.create_room(create_request("Chat room")).await.unwrap();
    let session = RoomSession::from(&room);
    let mut alice = coordinator(&server_url);
    let mut bob = coordinator(&server_url);
    assert!(alice.join_room(session.clone(), "alice", Role::Host).await);
    assert!(bob.join_room(session, "bob", Role::Guest).await);
    pump_until(&mut alice, |c| c.participants().len() == 2).await;

    // when (操作):
    let sent = bob.send_message("good luck").unwrap();
    pump_until(&mut alice, |c| !c.messages().is_empty()).await;
    bob.leave_room();
    pump_until(&mut alice, |c| c.participants().len() == 1).await;

    // then (期待する結果):
    assert_eq!(alice.messages()[0].id, sent.id);
    assert_eq!(alice.messages()[0].user.name, "bob");
    assert_eq!(alice.participants()[0].username, "alice");
}

#[tokio::test]
async fn test_full_topic_rejects_subscription() {
    // テスト項目: 購読者数の上限に達したトピックへの接続は切断状態のハンドルになる
    // given (前提条件):
    let server_url = spawn_server(1).await;
    let transport = WebSocketTransport::new(&server_url);
    let first = RoomChannel::connect(&transport, "room:full", "first").await;

    // when (操作):
    let second = RoomChannel::connect(&transport, "room:full", "second").await;

    // then (期待する結果):
    assert!(first.is_connected());
    assert!(!second.is_connected());
}

#[tokio::test]
async fn test_join_against_unreachable_server_keeps_room_for_rejoin() {
    // テスト項目: サーバーに接続できない場合は接続失敗を通知し、ルームは再参加用に保持される
    // given (前提条件):
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let mut client = coordinator(&server_url);
    let session = RoomSession {
        id: "r-offline".to_string(),
        name: "Offline".to_string(),
        code: "OFF123".to_string(),
    };

    // when (操作):
    let joined = client.join_room(session, "carol", Role::Guest).await;

    // then (期待する結果):
    assert!(!joined);
    assert!(!client.is_connected());
    assert_eq!(client.phase(), RoomPhase::Disconnected);
    assert_eq!(client.current_room().map(|r| r.code.as_str()), Some("OFF123"));
    assert_eq!(
        client.take_notices(),
        vec![RoomNotice::ConnectionFailed {
            room_name: "Offline".to_string()
        }]
    );
}
