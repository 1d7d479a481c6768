use crate::domain::entities::{Booking, BookingConfirmation, CreateBookingRequest};
use crate::infrastructure::http::middleware::{ApiResult, AppState, AuthenticatedUser};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

/// POST /api/bookings - the caller always owns the booking
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(mut request): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<BookingConfirmation>)> {
    request.owner_id = Some(auth_user.profile.id.clone());
    let confirmation = state.booking_service.create_booking(request).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// GET /api/bookings/mine
pub async fn list_my_bookings(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<Booking>>> {
    let bookings = state
        .booking_service
        .list_bookings_for_owner(&auth_user.profile.id)
        .await?;
    Ok(Json(bookings))
}

/// DELETE /api/bookings/:id
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .booking_service
        .cancel_booking(&auth_user.profile, &booking_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
