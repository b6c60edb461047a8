//! UseCase: ルーム作成
//!
//! 参加コードはランダム生成し、衝突したら作り直す。

use std::sync::Arc;

use typefast_shared::time::Clock;
use uuid::Uuid;

use crate::domain::{
    GameMode, RepositoryError, Room, RoomCodeFactory, RoomName, RoomRepository, Timestamp, UserId,
};

use super::error::CreateRoomError;

/// ルームで選べる単語数
pub const ALLOWED_WORD_COUNTS: [u32; 3] = [10, 25, 50];

const MAX_CODE_ATTEMPTS: usize = 8;

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn execute(
        &self,
        name: String,
        host_id: String,
        mode: GameMode,
        word_count: u32,
    ) -> Result<Room, CreateRoomError> {
        let name = RoomName::new(name).map_err(|e| CreateRoomError::InvalidInput(e.to_string()))?;
        let host_id =
            UserId::new(host_id).map_err(|e| CreateRoomError::InvalidInput(e.to_string()))?;
        if !ALLOWED_WORD_COUNTS.contains(&word_count) {
            return Err(CreateRoomError::InvalidInput(format!(
                "word count must be one of {:?}",
                ALLOWED_WORD_COUNTS
            )));
        }

        let created_at = Timestamp::new(self.clock.now_millis());
        for _ in 0..MAX_CODE_ATTEMPTS {
            let room = Room {
                id: Uuid::new_v4(),
                code: RoomCodeFactory::generate(),
                name: name.clone(),
                host_id: host_id.clone(),
                mode,
                word_count,
                created_at,
            };
            match self.repository.insert(room.clone()).await {
                Ok(()) => {
                    tracing::info!(
                        "Room '{}' created with code {}",
                        room.name.as_str(),
                        room.code.as_str()
                    );
                    return Ok(room);
                }
                Err(RepositoryError::DuplicateRoomCode(code)) => {
                    tracing::debug!("Room code {} already taken, retrying", code);
                }
                Err(e) => return Err(CreateRoomError::InvalidInput(e.to_string())),
            }
        }

        Err(CreateRoomError::CodeExhausted)
    }
}
