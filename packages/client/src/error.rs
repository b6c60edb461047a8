//! Error types for the TypeFast client.

use thiserror::Error;

/// Realtime channel errors
#[derive(Debug, Error, PartialEq)]
pub enum ChannelError {
    /// The transport refused the subscription (bad topic, topic full, offline hub)
    #[error("Subscription rejected: {0}")]
    Rejected(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The link is already closed
    #[error("Channel closed")]
    Closed,

    #[error("Failed to encode frame: {0}")]
    Encode(String),
}

/// Room directory errors
#[derive(Debug, Error, PartialEq)]
pub enum RoomDirectoryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    /// The server refused the request (status code, message)
    #[error("Request rejected ({0}): {1}")]
    Rejected(u16, String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Leaderboard errors
#[derive(Debug, Error, PartialEq)]
pub enum LeaderboardError {
    #[error("Result rejected ({0}): {1}")]
    Rejected(u16, String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    RoomDirectory(#[from] RoomDirectoryError),

    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Terminal (readline) error
    #[error("Terminal error: {0}")]
    Terminal(String),
}
