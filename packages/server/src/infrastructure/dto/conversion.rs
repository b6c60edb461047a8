//! Conversion logic between DTOs and domain entities.

use typefast_shared::{
    api::{LeaderboardEntryDto, RoomDto, RoomMode},
    time::millis_to_rfc3339,
};

use crate::domain::{GameMode, LeaderboardEntry, Room};

// ========================================
// DTO → Domain
// ========================================

impl From<RoomMode> for GameMode {
    fn from(mode: RoomMode) -> Self {
        match mode {
            RoomMode::Time => GameMode::Time,
            RoomMode::Words => GameMode::Words,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<GameMode> for RoomMode {
    fn from(mode: GameMode) -> Self {
        match mode {
            GameMode::Time => RoomMode::Time,
            GameMode::Words => RoomMode::Words,
        }
    }
}

impl From<Room> for RoomDto {
    fn from(room: Room) -> Self {
        Self {
            id: room.id.to_string(),
            code: room.code.as_str().to_string(),
            name: room.name.as_str().to_string(),
            host_id: room.host_id.as_str().to_string(),
            mode: room.mode.into(),
            word_count: room.word_count,
            created_at: millis_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<LeaderboardEntry> for LeaderboardEntryDto {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            user_id: entry.user_id.as_str().to_string(),
            username: entry.username,
            points: entry.totals.points,
            best_wpm: entry.totals.best_wpm,
            last_wpm: entry.last_wpm,
            last_accuracy: entry.last_accuracy,
            difficulty: entry.difficulty,
            updated_at: millis_to_rfc3339(entry.updated_at.value()),
            earned_points: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomCode, RoomName, Timestamp, UserId};
    use typefast_shared::scoring::Difficulty;
    use uuid::Uuid;

    #[test]
    fn test_room_to_dto() {
        // テスト項目: ドメインの Room が DTO に変換される
        // given (前提条件):
        let id = Uuid::new_v4();
        let room = Room {
            id,
            code: RoomCode::new("ABC123".to_string()).unwrap(),
            name: RoomName::new("Lunch race".to_string()).unwrap(),
            host_id: UserId::new("u1".to_string()).unwrap(),
            mode: GameMode::Time,
            word_count: 50,
            created_at: Timestamp::new(0),
        };

        // when (操作):
        let dto: RoomDto = room.into();

        // then (期待する結果):
        assert_eq!(dto.id, id.to_string());
        assert_eq!(dto.code, "ABC123");
        assert_eq!(dto.mode, RoomMode::Time);
        assert_eq!(dto.created_at, "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_leaderboard_entry_to_dto() {
        // テスト項目: リーダーボードの集計が DTO に変換される
        // given (前提条件):
        let mut entry = LeaderboardEntry::new(
            UserId::new("u1".to_string()).unwrap(),
            "alice".to_string(),
            Timestamp::new(0),
        );
        entry.record(60, 90, Difficulty::Medium, Timestamp::new(1000));

        // when (操作):
        let dto: LeaderboardEntryDto = entry.into();

        // then (期待する結果):
        assert_eq!(dto.points, 81);
        assert_eq!(dto.best_wpm, 60);
        assert_eq!(dto.last_accuracy, 90);
        assert_eq!(dto.updated_at, "1970-01-01T00:00:01.000Z");
        assert_eq!(dto.earned_points, None);
    }
}
