use crate::infrastructure::http::controllers as api;
use crate::infrastructure::http::middleware::{require_identity, AppState};
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    // Everything under /api needs a resolved caller
    let protected = Router::new()
        .route("/api/rooms", get(api::rooms::list_rooms))
        .route("/api/rooms", post(api::rooms::create_room))
        .route("/api/rooms/:id", patch(api::rooms::update_room))
        .route("/api/rooms/:id", delete(api::rooms::deactivate_room))
        .route(
            "/api/availability",
            get(api::availability::get_availability),
        )
        .route("/api/bookings", post(api::bookings::create_booking))
        .route("/api/bookings/mine", get(api::bookings::list_my_bookings))
        .route("/api/bookings/:id", delete(api::bookings::cancel_booking))
        .route("/api/assistant/chat", post(api::assistant::chat))
        .route("/api/users", get(api::users::list_users))
        .route("/api/users/me", get(api::users::get_me))
        .route("/api/users/:id/role", patch(api::users::update_role))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}
