use crate::domain::entities::{
    Booking, NewBooking, Profile, Room, RoomFilter, UserRole,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::booking_repository::BookingRepository;
use crate::domain::ports::profile_repository::ProfileRepository;
use crate::domain::ports::room_lock::RoomLock;
use crate::domain::ports::room_repository::RoomRepository;
use crate::domain::services::overlaps;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    rooms: HashMap<String, Room>,
    bookings: Vec<Booking>,
    profiles: HashMap<String, Profile>,
}

impl Tables {
    fn owner_name(&self, user_id: &str) -> Option<String> {
        self.profiles.get(user_id).map(Profile::display_name)
    }

    /// Bookings carry the owner's current display name, like the SQL join.
    fn hydrate(&self, booking: &Booking) -> Booking {
        Booking {
            owner_name: self.owner_name(&booking.user_id),
            ..booking.clone()
        }
    }
}

/// In-process store implementing the same ports as [`Database`](super::Database).
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a room as-is.
    pub async fn seed_room(&self, room: Room) {
        let mut tables = self.tables.lock().await;
        tables.rooms.insert(room.id.clone(), room);
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn create_room(&self, room: &Room) -> DomainResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.rooms.values().any(|r| r.name == room.name) {
            return Err(DomainError::Conflict(format!(
                "A room named \"{}\" already exists",
                room.name
            )));
        }
        tables.rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn update_room(&self, room: &Room) -> DomainResult<()> {
        let mut tables = self.tables.lock().await;
        match tables.rooms.get_mut(&room.id) {
            Some(existing) => {
                *existing = room.clone();
                Ok(())
            }
            None => Err(DomainError::NotFound(format!("Room {} not found", room.id))),
        }
    }

    async fn get_room(&self, id: &str) -> DomainResult<Option<Room>> {
        Ok(self.tables.lock().await.rooms.get(id).cloned())
    }

    async fn get_room_by_name(&self, name: &str) -> DomainResult<Option<Room>> {
        let tables = self.tables.lock().await;
        Ok(tables.rooms.values().find(|r| r.name == name).cloned())
    }

    async fn list_rooms(&self, filter: &RoomFilter) -> DomainResult<Vec<Room>> {
        let tables = self.tables.lock().await;
        let mut rooms: Vec<Room> = tables
            .rooms
            .values()
            .filter(|room| filter.matches(room))
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rooms)
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn list_bookings_in_window(
        &self,
        room_id: Option<&str>,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> DomainResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| room_id.map_or(true, |id| b.room_id == id))
            .filter(|b| b.start_time <= window_end && b.end_time >= window_start)
            .map(|b| tables.hydrate(b))
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    async fn insert_booking(&self, booking: &NewBooking) -> DomainResult<Booking> {
        let mut tables = self.tables.lock().await;

        // Check and insert under one lock so concurrent writers cannot interleave.
        if let Some(existing) = tables.bookings.iter().find(|b| {
            b.room_id == booking.room_id
                && overlaps(b.start_time, b.end_time, booking.start_time, booking.end_time)
        }) {
            return Err(tables.hydrate(existing).conflict_error());
        }

        let stored = booking.clone().into_booking(None);
        tables.bookings.push(stored.clone());
        Ok(tables.hydrate(&stored))
    }

    async fn get_booking(&self, id: &str) -> DomainResult<Option<Booking>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bookings
            .iter()
            .find(|b| b.id == id)
            .map(|b| tables.hydrate(b)))
    }

    async fn list_bookings_for_owner(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| tables.hydrate(b))
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    async fn delete_booking(&self, id: &str) -> DomainResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.bookings.len();
        tables.bookings.retain(|b| b.id != id);
        if tables.bookings.len() == before {
            return Err(DomainError::NotFound(format!("Booking {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn get_profile(&self, id: &str) -> DomainResult<Option<Profile>> {
        Ok(self.tables.lock().await.profiles.get(id).cloned())
    }

    async fn list_profiles(&self) -> DomainResult<Vec<Profile>> {
        let tables = self.tables.lock().await;
        let mut profiles: Vec<Profile> = tables.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn upsert_profile(&self, profile: &Profile) -> DomainResult<()> {
        let mut tables = self.tables.lock().await;
        tables.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn update_role(&self, id: &str, role: UserRole) -> DomainResult<()> {
        let mut tables = self.tables.lock().await;
        let profile = tables
            .profiles
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", id)))?;
        profile.role = role;
        profile.updated_at = chrono::Utc::now().to_rfc3339();
        Ok(())
    }
}

/// Lease table for a single process.
#[derive(Default)]
pub struct InMemoryRoomLock {
    leases: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryRoomLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomLock for InMemoryRoomLock {
    async fn acquire(&self, key: &str, owner: &str, ttl_seconds: u64) -> DomainResult<bool> {
        let mut leases = self.leases.lock().await;
        let now = Instant::now();
        match leases.get(key) {
            Some((holder, expires_at)) if holder != owner && *expires_at > now => Ok(false),
            _ => {
                leases.insert(
                    key.to_string(),
                    (owner.to_string(), now + Duration::from_secs(ttl_seconds)),
                );
                Ok(true)
            }
        }
    }

    async fn release(&self, key: &str, owner: &str) -> DomainResult<()> {
        let mut leases = self.leases.lock().await;
        if leases.get(key).is_some_and(|(holder, _)| holder == owner) {
            leases.remove(key);
        }
        Ok(())
    }
}
