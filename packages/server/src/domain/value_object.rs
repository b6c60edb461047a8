//! Value Object 定義
//!
//! 生の文字列を検証済みのドメイン型に変換します。
//! 一度生成された Value Object は常に有効な値を保持します。

use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use super::error::ValueObjectError;

const MAX_TOPIC_LEN: usize = 128;
const MAX_KEY_LEN: usize = 64;
const MAX_ROOM_NAME_LEN: usize = 64;
const MAX_USER_ID_LEN: usize = 64;
pub const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn validate_token(
    value: &str,
    max_len: usize,
    field: &'static str,
) -> Result<(), ValueObjectError> {
    if value.is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    if value.chars().count() > max_len {
        return Err(ValueObjectError::TooLong(field, max_len));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ValueObjectError::InvalidFormat(field));
    }
    Ok(())
}

/// Pub/sub トピック名（例: `room:0b7e...`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Topic(String);

impl Topic {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_token(&value, MAX_TOPIC_LEN, "topic")?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Topic {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Presence キー（クライアントが参加ごとに生成する参加者 ID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PresenceKey(String);

impl PresenceKey {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_token(&value, MAX_KEY_LEN, "presence key")?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PresenceKey {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// WebSocket 接続ごとの ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ルームの参加コード（英大文字と数字 6 桁）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoomCode(String);

impl RoomCode {
    /// 小文字は大文字に正規化される
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let normalized = value.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(ValueObjectError::Empty("room code"));
        }
        if normalized.len() != ROOM_CODE_LEN
            || !normalized.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
        {
            return Err(ValueObjectError::InvalidFormat("room code"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// RoomCode の生成
pub struct RoomCodeFactory;

impl RoomCodeFactory {
    pub fn generate() -> RoomCode {
        let mut rng = rand::thread_rng();
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET[idx] as char
            })
            .collect();
        RoomCode(code)
    }
}

/// ルーム表示名
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::Empty("room name"));
        }
        if trimmed.chars().count() > MAX_ROOM_NAME_LEN {
            return Err(ValueObjectError::TooLong("room name", MAX_ROOM_NAME_LEN));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 認証済みユーザーの ID（認証は外部サービスが担当）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_token(&value, MAX_USER_ID_LEN, "user id")?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix タイムスタンプ（ミリ秒, UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
