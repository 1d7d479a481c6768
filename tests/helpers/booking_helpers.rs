#![allow(dead_code)]
use findnkeep::application::services::{BookingPolicy, BookingService, CapacityPolicy};
use findnkeep::domain::entities::{CreateBookingRequest, Profile, Room, UserRole};
use findnkeep::domain::ports::profile_repository::ProfileRepository;
use findnkeep::domain::ports::room_repository::RoomRepository;
use findnkeep::infrastructure::persistence::distributed_lock::DatabaseRoomLock;
use findnkeep::infrastructure::persistence::Database;
use std::sync::Arc;

pub const MONDAY: &str = "2025-03-03";

pub async fn create_test_room(db: &Database, name: &str, capacity: i64) -> Room {
    let room = Room::new(
        name.to_string(),
        None,
        capacity,
        Some("Floor 2".to_string()),
        vec!["Projector".to_string()],
    );
    db.create_room(&room)
        .await
        .expect("Failed to create test room");
    room
}

pub async fn create_inactive_room(db: &Database, name: &str, capacity: i64) -> Room {
    let mut room = create_test_room(db, name, capacity).await;
    room.is_active = false;
    db.update_room(&room)
        .await
        .expect("Failed to deactivate test room");
    room
}

pub async fn create_test_profile(
    db: &Database,
    id: &str,
    first_name: &str,
    last_name: &str,
    role: UserRole,
) -> Profile {
    let profile = Profile::new(
        id.to_string(),
        format!("{}@example.com", first_name.to_lowercase()),
        Some(first_name.to_string()),
        Some(last_name.to_string()),
        role,
    );
    db.upsert_profile(&profile)
        .await
        .expect("Failed to create test profile");
    profile
}

pub fn booking_service(db: &Database) -> BookingService {
    booking_service_with(db, CapacityPolicy::Reject)
}

pub fn booking_service_with(db: &Database, capacity: CapacityPolicy) -> BookingService {
    BookingService::new(
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        Arc::new(DatabaseRoomLock::new(db.clone())),
        BookingPolicy {
            capacity,
            ..BookingPolicy::default()
        },
    )
}

pub fn booking_request(
    room_id: &str,
    owner_id: &str,
    date: &str,
    start: &str,
    end: &str,
    title: &str,
) -> CreateBookingRequest {
    CreateBookingRequest {
        room_id: Some(room_id.to_string()),
        owner_id: Some(owner_id.to_string()),
        date: Some(date.to_string()),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        title: Some(title.to_string()),
        priority: Some("medium".to_string()),
        ..CreateBookingRequest::default()
    }
}
