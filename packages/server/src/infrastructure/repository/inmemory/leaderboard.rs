//! InMemory Leaderboard Repository 実装

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use typefast_shared::scoring::Difficulty;

use crate::domain::{LeaderboardEntry, LeaderboardRepository, Timestamp, UserId};

#[derive(Default)]
pub struct InMemoryLeaderboardRepository {
    entries: Arc<Mutex<HashMap<UserId, LeaderboardEntry>>>,
}

impl InMemoryLeaderboardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryLeaderboardRepository {
    async fn find(&self, user_id: &UserId) -> Option<LeaderboardEntry> {
        let entries = self.entries.lock().await;
        entries.get(user_id).cloned()
    }

    async fn save(&self, entry: LeaderboardEntry) {
        let mut entries = self.entries.lock().await;
        entries.insert(entry.user_id.clone(), entry);
    }

    async fn record(
        &self,
        user_id: UserId,
        username: String,
        wpm: u32,
        accuracy: u32,
        difficulty: Difficulty,
        now: Timestamp,
    ) -> (LeaderboardEntry, u64) {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .entry(user_id.clone())
            .or_insert_with(|| LeaderboardEntry::new(user_id, username.clone(), now));
        entry.username = username;
        let earned = entry.record(wpm, accuracy, difficulty, now);
        (entry.clone(), earned)
    }

    async fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let entries = self.entries.lock().await;
        let mut ranked: Vec<LeaderboardEntry> = entries.values().cloned().collect();
        ranked.sort_by(|a, b| {
            b.totals
                .points
                .cmp(&a.totals.points)
                .then_with(|| b.totals.best_wpm.cmp(&a.totals.best_wpm))
                .then_with(|| a.username.cmp(&b.username))
        });
        ranked.truncate(limit);
        ranked
    }
}
