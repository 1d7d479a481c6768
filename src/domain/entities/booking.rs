use crate::domain::errors::DomainError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage format for booking instants (naive local wall-clock, lexicographically sortable)
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn format_instant(instant: &NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

pub fn parse_instant(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, INSTANT_FORMAT)
        .map_err(|e| format!("Invalid stored instant {}: {}", s, e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingType {
    #[default]
    Internal,
    External,
}

impl fmt::Display for MeetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingType::Internal => write!(f, "internal"),
            MeetingType::External => write!(f, "external"),
        }
    }
}

impl FromStr for MeetingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "internal" => Ok(MeetingType::Internal),
            "external" => Ok(MeetingType::External),
            _ => Err(format!("Invalid meeting type: {}", s)),
        }
    }
}

/// A persisted booking. `owner_name` is joined from the owner's profile when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub priority: Priority,
    pub attendees: Option<i64>,
    pub zoom_required: bool,
    pub meeting_type: MeetingType,
    pub owner_name: Option<String>,
    pub created_at: String,
}

impl Booking {
    /// The `SlotConflict` a new booking overlapping this one is rejected with.
    pub fn conflict_error(&self) -> DomainError {
        DomainError::SlotConflict {
            title: self.title.clone(),
            owner: self.owner_name.clone(),
            start: self.start_time.format("%H:%M").to_string(),
            end: self.end_time.format("%H:%M").to_string(),
        }
    }
}

/// A validated booking ready to be written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub priority: Priority,
    pub attendees: Option<i64>,
    pub zoom_required: bool,
    pub meeting_type: MeetingType,
    pub created_at: String,
}

impl NewBooking {
    pub fn into_booking(self, owner_name: Option<String>) -> Booking {
        Booking {
            id: self.id,
            room_id: self.room_id,
            user_id: self.user_id,
            title: self.title,
            start_time: self.start_time,
            end_time: self.end_time,
            priority: self.priority,
            attendees: self.attendees,
            zoom_required: self.zoom_required,
            meeting_type: self.meeting_type,
            owner_name,
            created_at: self.created_at,
        }
    }
}

/// Raw booking request as submitted by the form or the assistant.
///
/// Every mandatory field is optional here so the writer can report exactly
/// which one is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBookingRequest {
    pub room_id: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub title: Option<String>,
    pub priority: Option<String>,
    pub attendees: Option<i64>,
    #[serde(default)]
    pub zoom_required: bool,
    pub meeting_type: Option<String>,
}

/// Result of a successful booking
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub room_id: String,
    pub room_name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub title: String,
    pub priority: Priority,
    pub attendees: Option<i64>,
    pub zoom_required: bool,
    pub meeting_type: MeetingType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
