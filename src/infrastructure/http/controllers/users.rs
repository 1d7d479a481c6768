use crate::domain::entities::{Profile, UpdateRoleRequest};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};
use axum::{
    extract::{Path, State},
    Extension, Json,
};

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Profile>>> {
    auth_user.require_superadmin()?;
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

/// GET /api/users/me
pub async fn get_me(Extension(auth_user): Extension<AuthenticatedUser>) -> Json<Profile> {
    Json(auth_user.profile)
}

/// PATCH /api/users/:id/role
pub async fn update_role(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> ApiResult<Json<Profile>> {
    let profile = state
        .user_service
        .update_role(&auth_user.profile, &user_id, request.role)
        .await?;
    Ok(Json(profile))
}
