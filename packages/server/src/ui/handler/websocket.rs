//! WebSocket connection handlers.
//!
//! `GET /ws?topic=<topic>&key=<presence key>` upgrades to a single topic
//! subscription. The first frame sent is always `subscribed`.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use typefast_shared::protocol::{ClientFrame, ServerFrame};

use crate::{
    domain::{ConnectionId, PresenceKey, Topic},
    ui::state::AppState,
    usecase::SubscribeError,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub topic: String,
    pub key: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubscribeQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let topic = Topic::try_from(query.topic.clone()).map_err(|e| {
        tracing::warn!("Invalid topic '{}': {}", query.topic, e);
        StatusCode::BAD_REQUEST
    })?;
    let key = PresenceKey::try_from(query.key.clone()).map_err(|e| {
        tracing::warn!("Invalid presence key '{}': {}", query.key, e);
        StatusCode::BAD_REQUEST
    })?;

    // Channel for frames pushed to this connection
    let (tx, rx) = mpsc::unbounded_channel();

    match state
        .subscribe_topic_usecase
        .execute(&topic, key.clone(), tx)
        .await
    {
        Ok(connection_id) => {
            tracing::info!(
                "Connection '{}' subscribed to '{}' as '{}'",
                connection_id,
                topic.as_str(),
                key.as_str()
            );
            let release = release_on_failed_upgrade(state.clone(), topic.clone(), connection_id);
            Ok(ws
                .on_failed_upgrade(release)
                .on_upgrade(move |socket| {
                    handle_socket(socket, state, topic, key, connection_id, rx)
                }))
        }
        Err(SubscribeError::TopicFull(_)) => {
            tracing::warn!("Topic '{}' is full, rejecting '{}'", topic.as_str(), key.as_str());
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(e) => {
            tracing::error!("Failed to subscribe '{}': {}", key.as_str(), e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Frees the slot taken before the upgrade when the handshake never completes.
fn release_on_failed_upgrade(
    state: Arc<AppState>,
    topic: Topic,
    connection_id: ConnectionId,
) -> impl FnOnce(axum::Error) + Send + 'static {
    move |e| {
        tracing::warn!("Upgrade of '{}' failed: {}", connection_id, e);
        tokio::spawn(async move {
            state
                .unsubscribe_topic_usecase
                .execute(&topic, connection_id)
                .await;
        });
    }
}

/// Forwards frames pushed via the MessagePusher to the WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    topic: Topic,
    key: PresenceKey,
    connection_id: ConnectionId,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (mut sender, mut receiver) = socket.split();

    let subscribed = ServerFrame::Subscribed {
        topic: topic.as_str().to_string(),
        key: key.as_str().to_string(),
    };
    let sent = match serde_json::to_string(&subscribed) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to encode subscribed frame: {}", e);
            false
        }
    };
    if !sent {
        state
            .unsubscribe_topic_usecase
            .execute(&topic, connection_id)
            .await;
        return;
    }

    let state_clone = state.clone();
    let topic_clone = topic.clone();

    // Frames from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received frame from '{}': {}", connection_id, text);
                    let frame = match serde_json::from_str::<ClientFrame>(text.as_str()) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!("Unparseable frame from '{}': {}", connection_id, e);
                            reject(&state_clone, connection_id, e.to_string()).await;
                            continue;
                        }
                    };
                    match frame {
                        ClientFrame::Track { meta } => {
                            if let Err(e) = state_clone
                                .track_presence_usecase
                                .execute(&topic_clone, connection_id, meta)
                                .await
                            {
                                tracing::warn!("Failed to track '{}': {}", connection_id, e);
                            }
                        }
                        ClientFrame::Broadcast { event, payload } => {
                            match state_clone
                                .relay_broadcast_usecase
                                .execute(&topic_clone, connection_id, event.clone(), payload)
                                .await
                            {
                                Ok(targets) => tracing::debug!(
                                    "Relayed '{}' from '{}' to {} subscriber(s)",
                                    event,
                                    connection_id,
                                    targets.len()
                                ),
                                Err(e) => tracing::warn!("Failed to relay '{}': {}", event, e),
                            }
                        }
                        ClientFrame::Leave => {
                            tracing::info!("Connection '{}' left", connection_id);
                            break;
                        }
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .unsubscribe_topic_usecase
        .execute(&topic, connection_id)
        .await;
}

async fn reject(state: &AppState, connection_id: ConnectionId, reason: String) {
    let frame = ServerFrame::Rejected { reason };
    if let Err(e) = state
        .relay_broadcast_usecase
        .reply(connection_id, &frame)
        .await
    {
        tracing::warn!("Failed to send rejected frame: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_upgrade_frees_topic_slot() {
        // テスト項目: ハンドシェイクが完了しなかった購読は解放され、上限に数えられない
        // given (前提条件):
        let state = Arc::new(AppState::in_memory(1));
        let topic = Topic::try_from("room:r1".to_string()).unwrap();
        let key = PresenceKey::try_from("ghost".to_string()).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection_id = state
            .subscribe_topic_usecase
            .execute(&topic, key, tx)
            .await
            .unwrap();

        // when (操作):
        release_on_failed_upgrade(state.clone(), topic.clone(), connection_id)(axum::Error::new(
            "connection closed before upgrade",
        ));
        let mut result = Err(SubscribeError::TopicFull(topic.as_str().to_string()));
        for _ in 0..50 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            let (tx, _rx) = mpsc::unbounded_channel();
            let key = PresenceKey::try_from("alice".to_string()).unwrap();
            result = state.subscribe_topic_usecase.execute(&topic, key, tx).await;
            if result.is_ok() {
                break;
            }
        }

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
