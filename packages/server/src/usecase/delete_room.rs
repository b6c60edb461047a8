//! UseCase: ルーム削除

use std::sync::Arc;

use crate::domain::{Room, RoomCode, RoomRepository};

use super::error::RoomLookupError;

/// ルーム削除のユースケース
pub struct DeleteRoomUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl DeleteRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, code: String) -> Result<Room, RoomLookupError> {
        let code = RoomCode::new(code.clone()).map_err(|_| RoomLookupError::InvalidCode(code))?;
        let room = self
            .repository
            .delete_by_code(&code)
            .await
            .map_err(|_| RoomLookupError::RoomNotFound(code.as_str().to_string()))?;
        tracing::info!("Room {} deleted", room.code.as_str());
        Ok(room)
    }
}
