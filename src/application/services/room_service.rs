use crate::domain::entities::{CreateRoomRequest, Room, RoomFilter, UpdateRoomRequest};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::room_repository::RoomRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct RoomService {
    room_repo: Arc<dyn RoomRepository>,
}

impl RoomService {
    pub fn new(room_repo: Arc<dyn RoomRepository>) -> Self {
        Self { room_repo }
    }

    pub async fn create_room(&self, request: CreateRoomRequest) -> DomainResult<Room> {
        let name = validate_name(&request.name)?;
        validate_capacity(request.capacity)?;
        self.ensure_name_free(&name, None).await?;

        let room = Room::new(
            name,
            non_empty(request.description),
            request.capacity,
            non_empty(request.location),
            request
                .amenities
                .as_ref()
                .map(|a| a.sanitize())
                .unwrap_or_default(),
        );
        self.room_repo.create_room(&room).await?;

        tracing::info!("Room created: id={}, name={}", room.id, room.name);
        Ok(room)
    }

    pub async fn update_room(&self, id: &str, request: UpdateRoomRequest) -> DomainResult<Room> {
        let mut room = self.get_room(id).await?;

        if let Some(name) = &request.name {
            let name = validate_name(name)?;
            if name != room.name {
                self.ensure_name_free(&name, Some(id)).await?;
            }
            room.name = name;
        }
        if let Some(capacity) = request.capacity {
            validate_capacity(capacity)?;
            room.capacity = capacity;
        }
        if request.description.is_some() {
            room.description = non_empty(request.description);
        }
        if request.location.is_some() {
            room.location = non_empty(request.location);
        }
        if let Some(amenities) = &request.amenities {
            room.amenities = amenities.sanitize();
        }
        if let Some(is_active) = request.is_active {
            room.is_active = is_active;
        }
        room.updated_at = chrono::Utc::now().to_rfc3339();

        self.room_repo.update_room(&room).await?;
        tracing::info!("Room updated: id={}", room.id);
        Ok(room)
    }

    /// Rooms are never hard-deleted; bookings keep referencing them.
    pub async fn deactivate_room(&self, id: &str) -> DomainResult<Room> {
        self.update_room(
            id,
            UpdateRoomRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn get_room(&self, id: &str) -> DomainResult<Room> {
        self.room_repo
            .get_room(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Room {} not found", id)))
    }

    pub async fn list_rooms(&self, include_inactive: bool) -> DomainResult<Vec<Room>> {
        let filter = if include_inactive {
            RoomFilter::default()
        } else {
            RoomFilter::active()
        };
        self.room_repo.list_rooms(&filter).await
    }

    async fn ensure_name_free(&self, name: &str, except_id: Option<&str>) -> DomainResult<()> {
        match self.room_repo.get_room_by_name(name).await? {
            Some(existing) if Some(existing.id.as_str()) != except_id => Err(
                DomainError::Conflict(format!("A room named \"{}\" already exists", name)),
            ),
            _ => Ok(()),
        }
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::ValidationError(
            "Room name is required".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn validate_capacity(capacity: i64) -> DomainResult<()> {
    if capacity < 1 {
        return Err(DomainError::ValidationError(
            "Capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
