//! TypeFast server: realtime topic relay with presence, room directory and
//! leaderboard.
//!
//! Layers:
//! - `domain`: value objects, entities and the ports (repository / pusher traits)
//! - `infrastructure`: in-memory repositories, WebSocket pusher, DTO conversion
//! - `usecase`: one use case per operation
//! - `ui`: axum router, handlers and the `Server` runner

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
