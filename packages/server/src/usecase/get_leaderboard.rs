//! UseCase: リーダーボード上位取得

use std::sync::Arc;

use crate::domain::{LeaderboardEntry, LeaderboardRepository};

/// 一度に返す最大件数
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

pub struct GetLeaderboardUseCase {
    repository: Arc<dyn LeaderboardRepository>,
}

impl GetLeaderboardUseCase {
    pub fn new(repository: Arc<dyn LeaderboardRepository>) -> Self {
        Self { repository }
    }

    /// ポイントの降順で最大 `limit` 件（上限 MAX_LEADERBOARD_LIMIT）
    pub async fn execute(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.repository
            .top(limit.min(MAX_LEADERBOARD_LIMIT))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Timestamp, UserId},
        infrastructure::repository::InMemoryLeaderboardRepository,
    };
    use typefast_shared::scoring::Difficulty;

    #[tokio::test]
    async fn test_limit_is_capped() {
        // テスト項目: 件数は上限で打ち切られる
        // given (前提条件):
        let repository = Arc::new(InMemoryLeaderboardRepository::new());
        for i in 0..(MAX_LEADERBOARD_LIMIT + 5) {
            let mut entry = LeaderboardEntry::new(
                UserId::new(format!("u{}", i)).unwrap(),
                format!("user{}", i),
                Timestamp::new(0),
            );
            entry.record(10, 100, Difficulty::Easy, Timestamp::new(0));
            repository.save(entry).await;
        }
        let usecase = GetLeaderboardUseCase::new(repository);

        // when (操作):
        let entries = usecase.execute(1000).await;

        // then (期待する結果):
        assert_eq!(entries.len(), MAX_LEADERBOARD_LIMIT);
    }
}
