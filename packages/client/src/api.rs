//! HTTP bridge to the room directory and the leaderboard.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use typefast_shared::{
    api::{CreateRoomRequest, ErrorResponse, LeaderboardEntryDto, RoomDto, SubmitResultRequest},
    scoring::Difficulty,
};

use crate::{
    coordinator::RoomSession,
    error::{LeaderboardError, RoomDirectoryError},
};

/// Rooms by join code
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn create_room(&self, request: CreateRoomRequest) -> Result<RoomDto, RoomDirectoryError>;
    async fn find_room_by_code(&self, code: &str) -> Result<RoomDto, RoomDirectoryError>;
    async fn list_rooms(&self) -> Result<Vec<RoomDto>, RoomDirectoryError>;
    async fn delete_room_by_code(&self, code: &str) -> Result<(), RoomDirectoryError>;
}

/// Where finished sessions are scored
#[async_trait]
pub trait LeaderboardBridge: Send + Sync {
    /// Add the session's points to the user's total; the response carries
    /// the points earned by this session.
    async fn upsert_entry(
        &self,
        user_id: &str,
        username: &str,
        wpm: u32,
        accuracy: u32,
        difficulty: Difficulty,
    ) -> Result<LeaderboardEntryDto, LeaderboardError>;

    async fn top_entries(&self, limit: usize) -> Result<Vec<LeaderboardEntryDto>, LeaderboardError>;
}

impl From<&RoomDto> for RoomSession {
    fn from(room: &RoomDto) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            code: room.code.clone(),
        }
    }
}

/// Room directory and leaderboard served by `typefast-server`
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(server_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Join codes are six characters of A-Z / 0-9; lowercase input is accepted
fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(code)
}

/// Message of an error response, falling back to the status text
async fn error_message(response: Response) -> (u16, String) {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    (status.as_u16(), message)
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    response.json::<T>().await.map_err(|e| e.to_string())
}

#[async_trait]
impl RoomDirectory for HttpApi {
    async fn create_room(&self, request: CreateRoomRequest) -> Result<RoomDto, RoomDirectoryError> {
        let response = self
            .client
            .post(self.url("/api/rooms"))
            .json(&request)
            .send()
            .await
            .map_err(|e| RoomDirectoryError::Request(e.to_string()))?;
        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Err(RoomDirectoryError::Rejected(status, message));
        }
        let room: RoomDto = parse(response).await.map_err(RoomDirectoryError::Request)?;
        tracing::info!("Created room '{}' with code {}", room.name, room.code);
        Ok(room)
    }

    async fn find_room_by_code(&self, code: &str) -> Result<RoomDto, RoomDirectoryError> {
        let normalized = normalize_code(code)
            .ok_or_else(|| RoomDirectoryError::RoomNotFound(code.to_string()))?;
        let response = self
            .client
            .get(self.url(&format!("/api/rooms/{}", normalized)))
            .send()
            .await
            .map_err(|e| RoomDirectoryError::Request(e.to_string()))?;
        match response.status() {
            status if status.is_success() => {
                parse(response).await.map_err(RoomDirectoryError::Request)
            }
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                Err(RoomDirectoryError::RoomNotFound(normalized))
            }
            _ => {
                let (status, message) = error_message(response).await;
                Err(RoomDirectoryError::Rejected(status, message))
            }
        }
    }

    async fn list_rooms(&self) -> Result<Vec<RoomDto>, RoomDirectoryError> {
        let response = self
            .client
            .get(self.url("/api/rooms"))
            .send()
            .await
            .map_err(|e| RoomDirectoryError::Request(e.to_string()))?;
        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Err(RoomDirectoryError::Rejected(status, message));
        }
        parse(response).await.map_err(RoomDirectoryError::Request)
    }

    async fn delete_room_by_code(&self, code: &str) -> Result<(), RoomDirectoryError> {
        let normalized = normalize_code(code)
            .ok_or_else(|| RoomDirectoryError::RoomNotFound(code.to_string()))?;
        let response = self
            .client
            .delete(self.url(&format!("/api/rooms/{}", normalized)))
            .send()
            .await
            .map_err(|e| RoomDirectoryError::Request(e.to_string()))?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(RoomDirectoryError::RoomNotFound(normalized)),
            _ => {
                let (status, message) = error_message(response).await;
                Err(RoomDirectoryError::Rejected(status, message))
            }
        }
    }
}

#[async_trait]
impl LeaderboardBridge for HttpApi {
    async fn upsert_entry(
        &self,
        user_id: &str,
        username: &str,
        wpm: u32,
        accuracy: u32,
        difficulty: Difficulty,
    ) -> Result<LeaderboardEntryDto, LeaderboardError> {
        let request = SubmitResultRequest {
            user_id: user_id.to_string(),
            username: username.to_string(),
            wpm,
            accuracy,
            difficulty,
        };
        let response = self
            .client
            .post(self.url("/api/leaderboard"))
            .json(&request)
            .send()
            .await
            .map_err(|e| LeaderboardError::Request(e.to_string()))?;
        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Err(LeaderboardError::Rejected(status, message));
        }
        parse(response).await.map_err(LeaderboardError::Request)
    }

    async fn top_entries(&self, limit: usize) -> Result<Vec<LeaderboardEntryDto>, LeaderboardError> {
        let response = self
            .client
            .get(self.url(&format!("/api/leaderboard?limit={}", limit)))
            .send()
            .await
            .map_err(|e| LeaderboardError::Request(e.to_string()))?;
        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Err(LeaderboardError::Rejected(status, message));
        }
        parse(response).await.map_err(LeaderboardError::Request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typefast_shared::api::RoomMode;

    #[test]
    fn test_normalize_code_uppercases_and_trims() {
        // テスト項目: 参加コードは前後の空白を除き大文字に正規化される
        // given (前提条件):
        let input = "  ab12cd ";

        // when (操作):
        let code = normalize_code(input);

        // then (期待する結果):
        assert_eq!(code.as_deref(), Some("AB12CD"));
    }

    #[test]
    fn test_normalize_code_rejects_path_characters() {
        // テスト項目: 英数字以外を含むコードは受け付けない
        // given (前提条件):
        let input = "../admin";

        // when (操作):
        let code = normalize_code(input);

        // then (期待する結果):
        assert_eq!(code, None);
    }

    #[test]
    fn test_room_session_from_room_dto() {
        // テスト項目: RoomDto から RoomSession を作れる
        // given (前提条件):
        let room = RoomDto {
            id: "r1".to_string(),
            code: "ABC123".to_string(),
            name: "Lunch race".to_string(),
            host_id: "host".to_string(),
            mode: RoomMode::Words,
            word_count: 25,
            created_at: "2023-01-01T00:00:00.000Z".to_string(),
        };

        // when (操作):
        let session = RoomSession::from(&room);

        // then (期待する結果):
        assert_eq!(session.topic(), "room:r1");
        assert_eq!(session.code, "ABC123");
    }

    #[tokio::test]
    async fn test_find_invalid_code_is_not_found_without_request() {
        // テスト項目: 不正なコードはリクエストせずに RoomNotFound になる
        // given (前提条件):
        let api = HttpApi::new("http://127.0.0.1:1");

        // when (操作):
        let result = api.find_room_by_code("no/such").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RoomDirectoryError::RoomNotFound("no/such".to_string()))
        );
    }
}
