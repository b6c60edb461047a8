//! Repository 実装
//!
//! - `inmemory`: HashMap を使ったインメモリ実装
//! - 将来的に: `postgres` など

pub mod inmemory;

pub use inmemory::{InMemoryLeaderboardRepository, InMemoryRoomRepository, InMemoryTopicRepository};
