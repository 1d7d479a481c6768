use crate::domain::entities::{CreateRoomRequest, Room, UpdateRoomRequest};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListRoomsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<ListRoomsQuery>,
) -> ApiResult<Json<Vec<Room>>> {
    let rooms = state.room_service.list_rooms(query.include_inactive).await?;
    Ok(Json(rooms))
}

/// POST /api/rooms
pub async fn create_room(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateRoomRequest>,
) -> ApiResult<(StatusCode, Json<Room>)> {
    auth_user.require_superadmin()?;
    let room = state.room_service.create_room(request).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// PATCH /api/rooms/:id
pub async fn update_room(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(room_id): Path<String>,
    Json(request): Json<UpdateRoomRequest>,
) -> ApiResult<Json<Room>> {
    auth_user.require_superadmin()?;
    let room = state.room_service.update_room(&room_id, request).await?;
    Ok(Json(room))
}

/// DELETE /api/rooms/:id - deactivates, bookings keep their room
pub async fn deactivate_room(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(room_id): Path<String>,
) -> ApiResult<Json<Room>> {
    auth_user.require_superadmin()?;
    let room = state.room_service.deactivate_room(&room_id).await?;
    Ok(Json(room))
}
