use crate::application::services::{
    AvailabilityService, BookingAssistant, BookingService, RoomService, UserService,
};
use crate::domain::entities::{Profile, UserRole};
use crate::infrastructure::http::middleware::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Header carrying the caller's user id, set by the authenticating gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Gateway headers used to provision a caller seen for the first time.
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_FIRST_NAME_HEADER: &str = "x-user-first-name";
pub const USER_LAST_NAME_HEADER: &str = "x-user-last-name";

#[derive(Clone)]
pub struct AppState {
    pub availability_service: AvailabilityService,
    pub booking_service: BookingService,
    pub room_service: RoomService,
    pub user_service: UserService,
    pub assistant: BookingAssistant,
}

/// The caller resolved from [`USER_ID_HEADER`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub profile: Profile,
}

impl AuthenticatedUser {
    pub fn require_superadmin(&self) -> Result<(), ApiError> {
        if self.profile.is_superadmin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Superadmin role required".to_string(),
            ))
        }
    }
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolve the caller's profile and attach it to the request. A caller with
/// no profile yet is created as an organizer when the gateway supplies an email.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = header_value(&request, USER_ID_HEADER).ok_or(ApiError::Unauthorized)?;

    let profile = match state.user_service.get_user(&user_id).await? {
        Some(profile) => profile,
        None => {
            let email = header_value(&request, USER_EMAIL_HEADER).ok_or_else(|| {
                tracing::debug!("Unknown user id {} without email header", user_id);
                ApiError::Unauthorized
            })?;
            let profile = state
                .user_service
                .ensure_profile(Profile::new(
                    user_id,
                    email.to_lowercase(),
                    header_value(&request, USER_FIRST_NAME_HEADER),
                    header_value(&request, USER_LAST_NAME_HEADER),
                    UserRole::Organizer,
                ))
                .await?;
            tracing::info!("Provisioned profile {} for {}", profile.id, profile.email);
            profile
        }
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { profile });
    Ok(next.run(request).await)
}
