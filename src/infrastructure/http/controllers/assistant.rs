use crate::domain::entities::{ChatReply, ChatRequest};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};
use axum::{extract::State, Extension, Json};

/// POST /api/assistant/chat
pub async fn chat(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatReply>> {
    let content = state
        .assistant
        .respond(&auth_user.profile.id, request.messages)
        .await?;
    Ok(Json(ChatReply { content }))
}
