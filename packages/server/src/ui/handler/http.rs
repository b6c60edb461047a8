//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    domain::Topic,
    infrastructure::dto::{
        CreateRoomRequest, ErrorResponse, LeaderboardEntryDto, LeaderboardQuery, RoomDto,
        SubmitResultRequest, TopicPresenceDto,
    },
    ui::state::AppState,
    usecase::{CreateRoomError, RoomLookupError, SubmitResultError},
};
use typefast_shared::api::DEFAULT_LEADERBOARD_LIMIT;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn lookup_error(e: RoomLookupError) -> ApiError {
    match e {
        RoomLookupError::InvalidCode(_) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        RoomLookupError::RoomNotFound(_) => api_error(StatusCode::NOT_FOUND, e.to_string()),
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a room with a fresh join code
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomDto>), ApiError> {
    let room = state
        .create_room_usecase
        .execute(
            request.name,
            request.host_id,
            request.mode.into(),
            request.word_count,
        )
        .await
        .map_err(|e| match e {
            CreateRoomError::InvalidInput(_) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
            CreateRoomError::CodeExhausted => {
                api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
        })?;
    Ok((StatusCode::CREATED, Json(room.into())))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomDto>> {
    let rooms = state.get_rooms_usecase.execute().await;
    Json(rooms.into_iter().map(RoomDto::from).collect())
}

/// Get room by join code
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomDto>, ApiError> {
    let room = state
        .get_room_detail_usecase
        .execute(code)
        .await
        .map_err(lookup_error)?;
    Ok(Json(room.into()))
}

/// Delete room by join code
pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .delete_room_usecase
        .execute(code)
        .await
        .map_err(lookup_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a finished session on the leaderboard
pub async fn submit_result(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitResultRequest>,
) -> Result<Json<LeaderboardEntryDto>, ApiError> {
    let submitted = state
        .submit_result_usecase
        .execute(
            request.user_id,
            request.username,
            request.wpm,
            request.accuracy,
            request.difficulty,
        )
        .await
        .map_err(|e: SubmitResultError| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let mut dto = LeaderboardEntryDto::from(submitted.entry);
    dto.earned_points = Some(submitted.earned_points);
    Ok(Json(dto))
}

/// Top entries by points
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<Vec<LeaderboardEntryDto>> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    let entries = state.get_leaderboard_usecase.execute(limit).await;
    Json(entries.into_iter().map(LeaderboardEntryDto::from).collect())
}

/// Debug endpoint to get the presence of a topic (for testing purposes)
pub async fn debug_topic_presence(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> Result<Json<TopicPresenceDto>, ApiError> {
    let topic =
        Topic::new(topic).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    let presence = state.get_topic_presence_usecase.execute(&topic).await;
    Ok(Json(TopicPresenceDto {
        topic: topic.into_string(),
        presence,
    }))
}
