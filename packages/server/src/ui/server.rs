//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        create_room, debug_topic_presence, delete_room, get_leaderboard, get_room_detail,
        get_rooms, health_check, submit_result, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// TypeFast realtime relay + HTTP API server
///
/// ```ignore
/// let server = Server::new(AppState::in_memory(32));
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// 全エンドポイントのルーター
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms).post(create_room))
            .route(
                "/api/rooms/{code}",
                get(get_room_detail).delete(delete_room),
            )
            .route("/api/leaderboard", get(get_leaderboard).post(submit_result))
            .route("/debug/topics/{topic}", get(debug_topic_presence))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to `host:port` and serve until Ctrl+C / SIGTERM
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws?topic=<topic>&key=<key>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve(listener).await?;
        Ok(())
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!("TypeFast server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
