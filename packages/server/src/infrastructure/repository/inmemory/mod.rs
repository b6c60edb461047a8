//! インメモリ Repository 実装

mod leaderboard;
mod room;
mod topic;

pub use leaderboard::InMemoryLeaderboardRepository;
pub use room::InMemoryRoomRepository;
pub use topic::InMemoryTopicRepository;
