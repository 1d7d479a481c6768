use crate::domain::entities::{AvailabilityTarget, RoomAvailability};
use crate::domain::services::parse_date;
use crate::infrastructure::http::middleware::{ApiResult, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
}

impl AvailabilityQuery {
    fn target(&self) -> AvailabilityTarget {
        match (&self.room_id, &self.room_name) {
            (Some(id), _) => AvailabilityTarget::Room(id.clone()),
            (None, Some(name)) => AvailabilityTarget::RoomNamed(name.clone()),
            (None, None) => AvailabilityTarget::AllActive,
        }
    }
}

/// GET /api/availability?date=YYYY-MM-DD[&room_id=|&room_name=]
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<Vec<RoomAvailability>>> {
    let date = parse_date(&query.date)?;
    let availability = state
        .availability_service
        .get_availability(&query.target(), date)
        .await?;
    Ok(Json(availability))
}
