use serde::{Deserialize, Serialize};

const MAX_AMENITY_LENGTH: usize = 50;
const MAX_AMENITIES_COUNT: usize = 20;

/// A bookable meeting room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub capacity: i64,
    pub location: Option<String>,
    pub amenities: Vec<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Room {
    pub fn new(
        name: String,
        description: Option<String>,
        capacity: i64,
        location: Option<String>,
        amenities: Vec<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            capacity,
            location,
            amenities,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Amenities as submitted: either a comma-separated string or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmenitiesInput {
    Text(String),
    List(Vec<String>),
}

impl AmenitiesInput {
    pub fn sanitize(&self) -> Vec<String> {
        match self {
            AmenitiesInput::Text(text) => sanitize_amenities(text.split(',')),
            AmenitiesInput::List(items) => sanitize_amenities(items.iter().map(String::as_str)),
        }
    }
}

/// Trim, drop empties, cap count and length, and strip markup-significant characters.
pub fn sanitize_amenities<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .take(MAX_AMENITIES_COUNT)
        .map(|item| {
            item.chars()
                .take(MAX_AMENITY_LENGTH)
                .filter(|c| !matches!(c, '<' | '>' | '\'' | '"' | '&'))
                .collect::<String>()
        })
        .collect()
}

/// DTO for creating a room
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub description: Option<String>,
    pub capacity: i64,
    pub location: Option<String>,
    pub amenities: Option<AmenitiesInput>,
}

/// DTO for updating a room; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i64>,
    pub location: Option<String>,
    pub amenities: Option<AmenitiesInput>,
    pub is_active: Option<bool>,
}

/// Room listing filter used by searches
#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub active_only: bool,
    pub min_capacity: Option<i64>,
}

impl RoomFilter {
    pub fn active() -> Self {
        Self {
            active_only: true,
            min_capacity: None,
        }
    }

    pub fn with_min_capacity(mut self, min_capacity: Option<i64>) -> Self {
        self.min_capacity = min_capacity;
        self
    }

    pub fn matches(&self, room: &Room) -> bool {
        (!self.active_only || room.is_active)
            && self.min_capacity.map_or(true, |min| room.capacity >= min)
    }
}
