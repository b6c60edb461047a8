//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! ルームコードをキーとした HashMap をインメモリ DB として使用します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, Room, RoomCode, RoomRepository};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Arc<Mutex<HashMap<RoomCode, Room>>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert(&self, room: Room) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room.code) {
            return Err(RepositoryError::DuplicateRoomCode(
                room.code.as_str().to_string(),
            ));
        }
        rooms.insert(room.code.clone(), room);
        Ok(())
    }

    async fn find_by_code(&self, code: &RoomCode) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(code).cloned()
    }

    async fn list(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        let mut list: Vec<Room> = rooms.values().cloned().collect();
        list.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.code.as_str().cmp(b.code.as_str()))
        });
        list
    }

    async fn delete_by_code(&self, code: &RoomCode) -> Result<Room, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .remove(code)
            .ok_or_else(|| RepositoryError::RoomNotFound(code.as_str().to_string()))
    }
}
