//! UseCase: 参加コードによるルーム取得

use std::sync::Arc;

use crate::domain::{Room, RoomCode, RoomRepository};

use super::error::RoomLookupError;

/// 参加コードによるルーム取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// コードは大文字小文字を区別しない
    pub async fn execute(&self, code: String) -> Result<Room, RoomLookupError> {
        let code = RoomCode::new(code.clone()).map_err(|_| RoomLookupError::InvalidCode(code))?;
        self.repository
            .find_by_code(&code)
            .await
            .ok_or_else(|| RoomLookupError::RoomNotFound(code.as_str().to_string()))
    }
}
