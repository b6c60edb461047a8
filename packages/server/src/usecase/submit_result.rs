//! UseCase: セッション結果のリーダーボード登録
//!
//! ポイントは加算、最高 WPM は上回ったときだけ更新する。

use std::sync::Arc;

use typefast_shared::{scoring::Difficulty, time::Clock};

use crate::domain::{LeaderboardEntry, LeaderboardRepository, Timestamp, UserId};

use super::error::SubmitResultError;

/// 登録結果（更新後の集計と今回の獲得ポイント）
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedResult {
    pub entry: LeaderboardEntry,
    pub earned_points: u64,
}

/// リーダーボード登録のユースケース
pub struct SubmitResultUseCase {
    repository: Arc<dyn LeaderboardRepository>,
    clock: Arc<dyn Clock>,
}

impl SubmitResultUseCase {
    pub fn new(repository: Arc<dyn LeaderboardRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn execute(
        &self,
        user_id: String,
        username: String,
        wpm: u32,
        accuracy: u32,
        difficulty: Difficulty,
    ) -> Result<SubmittedResult, SubmitResultError> {
        let user_id =
            UserId::new(user_id).map_err(|e| SubmitResultError::InvalidInput(e.to_string()))?;
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(SubmitResultError::InvalidInput(
                "username must not be empty".to_string(),
            ));
        }
        if accuracy > 100 {
            return Err(SubmitResultError::InvalidInput(
                "accuracy must be at most 100".to_string(),
            ));
        }

        let now = Timestamp::new(self.clock.now_millis());
        let (entry, earned_points) = self
            .repository
            .record(user_id, username, wpm, accuracy, difficulty, now)
            .await;

        tracing::info!(
            "Recorded {} wpm / {}% ({}) for '{}': +{} points",
            wpm,
            accuracy,
            difficulty,
            entry.user_id.as_str(),
            earned_points
        );
        Ok(SubmittedResult {
            entry,
            earned_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repository::InMemoryLeaderboardRepository;
    use typefast_shared::time::FixedClock;

    fn create_usecase() -> SubmitResultUseCase {
        SubmitResultUseCase::new(
            Arc::new(InMemoryLeaderboardRepository::new()),
            Arc::new(FixedClock::new(1000)),
        )
    }

    #[tokio::test]
    async fn test_first_submission_creates_entry() {
        // テスト項目: 初回登録でエントリが作られ、獲得ポイントが返る
        // given (前提条件):
        let usecase = create_usecase();

        // when (操作):
        let result = usecase
            .execute(
                "u1".to_string(),
                "alice".to_string(),
                60,
                90,
                Difficulty::Medium,
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(result.earned_points, 81);
        assert_eq!(result.entry.totals.points, 81);
        assert_eq!(result.entry.totals.best_wpm, 60);
    }

    #[tokio::test]
    async fn test_points_accumulate_and_best_wpm_only_rises() {
        // テスト項目: ポイントは加算され、最高 WPM は下がらない
        // given (前提条件):
        let usecase = create_usecase();
        usecase
            .execute("u1".to_string(), "alice".to_string(), 80, 100, Difficulty::Easy)
            .await
            .unwrap();

        // when (操作):
        let result = usecase
            .execute("u1".to_string(), "alice".to_string(), 40, 100, Difficulty::Hard)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(result.earned_points, 80);
        assert_eq!(result.entry.totals.points, 160);
        assert_eq!(result.entry.totals.best_wpm, 80);
        assert_eq!(result.entry.last_wpm, 40);
    }

    #[tokio::test]
    async fn test_overlapping_submissions_keep_every_session() {
        // テスト項目: 同じユーザーの結果が同時に届いても、両方のポイントが加算される
        // given (前提条件):
        let usecase = create_usecase();

        // when (操作):
        let (first, second) = tokio::join!(
            usecase.execute("u1".to_string(), "alice".to_string(), 50, 100, Difficulty::Easy),
            usecase.execute("u1".to_string(), "alice".to_string(), 30, 100, Difficulty::Easy),
        );

        // then (期待する結果):
        let earned = first.unwrap().earned_points + second.unwrap().earned_points;
        assert_eq!(earned, 80);
        let top = usecase.repository.top(1).await;
        assert_eq!(top[0].totals.points, 80);
        assert_eq!(top[0].totals.best_wpm, 50);
    }

    #[tokio::test]
    async fn test_rejects_accuracy_over_100() {
        // テスト項目: 100 を超える正確さは拒否される
        // given (前提条件):
        let usecase = create_usecase();

        // when (操作):
        let result = usecase
            .execute("u1".to_string(), "alice".to_string(), 60, 101, Difficulty::Easy)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SubmitResultError::InvalidInput(_))));
    }
}
