use crate::domain::entities::{Booking, Priority, Room};
use chrono::NaiveDate;
use serde::Serialize;

/// A derived `{start, end}` span of one day, either booked or free. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
    pub duration: String,
    pub is_booked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub capacity: i64,
    pub location: Option<String>,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            capacity: room.capacity,
            location: room.location.clone(),
        }
    }
}

/// Booked and free slots of one room on one date
#[derive(Debug, Clone, Serialize)]
pub struct RoomAvailability {
    pub room: RoomSummary,
    pub date: NaiveDate,
    pub booked: Vec<TimeSlot>,
    pub free: Vec<TimeSlot>,
}

/// Which rooms an availability query covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityTarget {
    Room(String),
    RoomNamed(String),
    AllActive,
}

/// Booking-owner details carried by a booked slot
pub(crate) fn booked_by(booking: &Booking) -> String {
    booking
        .owner_name
        .clone()
        .unwrap_or_else(|| "Unknown".to_string())
}
