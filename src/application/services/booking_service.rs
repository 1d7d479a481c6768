use crate::domain::entities::{
    Booking, BookingConfirmation, CreateBookingRequest, MeetingType, NewBooking, Priority,
    Profile, Room,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::booking_repository::BookingRepository;
use crate::domain::ports::room_lock::RoomLock;
use crate::domain::ports::room_repository::RoomRepository;
use crate::domain::services::{overlaps, parse_clock_time, parse_date};
use chrono::NaiveDateTime;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// What to do when the attendee count exceeds the room capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CapacityPolicy {
    #[default]
    Reject,
    Warn,
}

impl FromStr for CapacityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(CapacityPolicy::Reject),
            "warn" => Ok(CapacityPolicy::Warn),
            _ => Err(format!("Invalid capacity policy: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingPolicy {
    pub capacity: CapacityPolicy,
    pub lock_ttl_seconds: u64,
    pub lock_attempts: u32,
    pub lock_retry_delay: Duration,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            capacity: CapacityPolicy::Reject,
            lock_ttl_seconds: 30,
            lock_attempts: 20,
            lock_retry_delay: Duration::from_millis(50),
        }
    }
}

/// A request that passed every check that does not need the room lock.
struct ValidatedBooking {
    room: Room,
    booking: NewBooking,
    warnings: Vec<String>,
}

/// The only component that writes bookings.
#[derive(Clone)]
pub struct BookingService {
    room_repo: Arc<dyn RoomRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    room_lock: Arc<dyn RoomLock>,
    policy: BookingPolicy,
}

impl BookingService {
    pub fn new(
        room_repo: Arc<dyn RoomRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        room_lock: Arc<dyn RoomLock>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            room_repo,
            booking_repo,
            room_lock,
            policy,
        }
    }

    /// Validate and persist a booking. The first failing check wins:
    /// missing field, format, range, room, capacity, then overlap.
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> DomainResult<BookingConfirmation> {
        let result = self.try_create_booking(request).await;

        match &result {
            Ok(confirmation) => {
                metrics::counter!("bookings_created_total").increment(1);
                tracing::info!(
                    "Booking created: id={}, room={}, {} {}-{}",
                    confirmation.booking_id,
                    confirmation.room_name,
                    confirmation.date,
                    confirmation.start_time,
                    confirmation.end_time
                );
            }
            Err(err) => {
                metrics::counter!("booking_rejections_total", "reason" => err.code())
                    .increment(1);
                if err.is_validation() {
                    tracing::warn!("Booking rejected: {}", err);
                } else {
                    tracing::error!("Booking failed: {}", err);
                }
            }
        }

        result
    }

    async fn try_create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> DomainResult<BookingConfirmation> {
        let validated = self.validate(request).await?;

        // Detached so an abandoned request still releases the room lock.
        let service = self.clone();
        let booking = validated.booking;
        let booking = tokio::spawn(async move { service.insert_under_room_lock(booking).await })
            .await
            .map_err(|e| DomainError::StoreUnavailable(format!("Booking task failed: {}", e)))??;

        Ok(confirmation(&validated.room, &booking, validated.warnings))
    }

    async fn insert_under_room_lock(&self, booking: NewBooking) -> DomainResult<Booking> {
        let lock_key = format!("room:{}", booking.room_id);
        let lock_owner = uuid::Uuid::new_v4().to_string();
        self.acquire_room_lock(&lock_key, &lock_owner).await?;

        let inserted = self.insert_without_overlap(&booking).await;

        if let Err(e) = self.room_lock.release(&lock_key, &lock_owner).await {
            tracing::error!("Failed to release lock {}: {}", lock_key, e);
        }

        inserted
    }

    async fn validate(&self, request: CreateBookingRequest) -> DomainResult<ValidatedBooking> {
        let room_id = required(&request.room_id, "room_id")?;
        let owner_id = required(&request.owner_id, "owner_id")?;
        let date = required(&request.date, "date")?;
        let start_time = required(&request.start_time, "start_time")?;
        let end_time = required(&request.end_time, "end_time")?;
        let title = required(&request.title, "title")?;
        let priority = required(&request.priority, "priority")?;

        let date = parse_date(date)?;
        let start = parse_clock_time(start_time).map_err(|e| e.for_field("start_time"))?;
        let end = parse_clock_time(end_time).map_err(|e| e.for_field("end_time"))?;
        let priority = Priority::from_str(priority).map_err(|_| DomainError::InvalidFormat {
            field: "priority".to_string(),
            value: priority.to_string(),
        })?;
        let meeting_type = match request.meeting_type.as_deref().map(str::trim) {
            None | Some("") => MeetingType::default(),
            Some(raw) => MeetingType::from_str(raw).map_err(|_| DomainError::InvalidFormat {
                field: "meeting_type".to_string(),
                value: raw.to_string(),
            })?,
        };
        if let Some(attendees) = request.attendees {
            if attendees < 1 {
                return Err(DomainError::InvalidFormat {
                    field: "attendees".to_string(),
                    value: attendees.to_string(),
                });
            }
        }

        if end <= start {
            return Err(DomainError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let room = self
            .room_repo
            .get_room(room_id)
            .await?
            .filter(|room| room.is_active)
            .ok_or_else(|| DomainError::RoomNotFound(room_id.to_string()))?;

        let mut warnings = Vec::new();
        if let Some(attendees) = request.attendees {
            if attendees > room.capacity {
                let exceeded = DomainError::CapacityExceeded {
                    attendees,
                    capacity: room.capacity,
                };
                match self.policy.capacity {
                    CapacityPolicy::Reject => return Err(exceeded),
                    CapacityPolicy::Warn => warnings.push(exceeded.to_string()),
                }
            }
        }

        let booking = NewBooking {
            id: uuid::Uuid::new_v4().to_string(),
            room_id: room.id.clone(),
            user_id: owner_id.to_string(),
            title: title.to_string(),
            start_time: start.on(date),
            end_time: end.on(date),
            priority,
            attendees: request.attendees,
            zoom_required: request.zoom_required,
            meeting_type,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        Ok(ValidatedBooking {
            room,
            booking,
            warnings,
        })
    }

    async fn acquire_room_lock(&self, key: &str, owner: &str) -> DomainResult<()> {
        let attempts = self.policy.lock_attempts.max(1);
        for attempt in 1..=attempts {
            if self
                .room_lock
                .acquire(key, owner, self.policy.lock_ttl_seconds)
                .await?
            {
                return Ok(());
            }
            tracing::warn!("Lock {} is held, attempt {}/{}", key, attempt, attempts);
            if attempt < attempts {
                tokio::time::sleep(self.policy.lock_retry_delay).await;
            }
        }
        Err(DomainError::StoreUnavailable(format!(
            "Room is busy with another booking, please retry ({})",
            key
        )))
    }

    /// Caller must hold the room lock.
    async fn insert_without_overlap(&self, booking: &NewBooking) -> DomainResult<Booking> {
        let existing = self
            .booking_repo
            .list_bookings_in_window(Some(&booking.room_id), booking.start_time, booking.end_time)
            .await?;

        if let Some(conflict) = existing
            .iter()
            .find(|b| overlaps(b.start_time, b.end_time, booking.start_time, booking.end_time))
        {
            return Err(conflict.conflict_error());
        }

        self.booking_repo.insert_booking(booking).await
    }

    /// The caller's bookings, earliest first.
    pub async fn list_bookings_for_owner(&self, owner_id: &str) -> DomainResult<Vec<Booking>> {
        let mut bookings = self.booking_repo.list_bookings_for_owner(owner_id).await?;
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    pub async fn cancel_booking(&self, actor: &Profile, booking_id: &str) -> DomainResult<()> {
        let booking = self
            .booking_repo
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Booking {} not found", booking_id)))?;

        if booking.user_id != actor.id && !actor.is_superadmin() {
            return Err(DomainError::Forbidden(
                "You can only cancel your own bookings".to_string(),
            ));
        }

        self.booking_repo.delete_booking(booking_id).await?;
        tracing::info!("Booking {} cancelled by {}", booking_id, actor.id);
        Ok(())
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> DomainResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::MissingField(field.to_string()))
}

fn clock_label(instant: &NaiveDateTime) -> String {
    instant.format("%H:%M").to_string()
}

fn confirmation(room: &Room, booking: &Booking, warnings: Vec<String>) -> BookingConfirmation {
    BookingConfirmation {
        booking_id: booking.id.clone(),
        room_id: room.id.clone(),
        room_name: room.name.clone(),
        date: booking.start_time.date().format("%Y-%m-%d").to_string(),
        start_time: clock_label(&booking.start_time),
        end_time: clock_label(&booking.end_time),
        title: booking.title.clone(),
        priority: booking.priority,
        attendees: booking.attendees,
        zoom_required: booking.zoom_required,
        meeting_type: booking.meeting_type,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UserRole;
    use crate::infrastructure::persistence::memory::{InMemoryRoomLock, InMemoryStore};

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: BookingService,
        room: Room,
    }

    async fn fixture(capacity: i64, policy: BookingPolicy) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let room = Room::new("Board Room".to_string(), None, capacity, None, vec![]);
        store.seed_room(room.clone()).await;
        let service = BookingService::new(
            store.clone(),
            store.clone(),
            Arc::new(InMemoryRoomLock::new()),
            policy,
        );
        Fixture {
            store,
            service,
            room,
        }
    }

    fn request(room: &Room, start: &str, end: &str) -> CreateBookingRequest {
        CreateBookingRequest {
            room_id: Some(room.id.clone()),
            owner_id: Some("user-1".to_string()),
            date: Some("2025-03-10".to_string()),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            title: Some("Sync".to_string()),
            priority: Some("medium".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_field_is_reported_before_anything_else() {
        let f = fixture(15, BookingPolicy::default()).await;
        let mut req = request(&f.room, "25:00", "09:00");
        req.title = Some("   ".to_string());

        let err = f.service.create_booking(req).await.unwrap_err();
        assert_eq!(err, DomainError::MissingField("title".to_string()));
    }

    #[tokio::test]
    async fn format_is_checked_before_range() {
        let f = fixture(15, BookingPolicy::default()).await;
        let err = f
            .service
            .create_booking(request(&f.room, "10:00", "9:60"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormat { ref field, .. } if field == "end_time"));
    }

    #[tokio::test]
    async fn equal_start_and_end_is_an_invalid_range() {
        let f = fixture(15, BookingPolicy::default()).await;
        let err = f
            .service
            .create_booking(request(&f.room, "10:00", "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange { .. }));
    }

    #[tokio::test]
    async fn unknown_priority_is_a_format_error() {
        let f = fixture(15, BookingPolicy::default()).await;
        let mut req = request(&f.room, "09:00", "10:00");
        req.priority = Some("urgent".to_string());
        let err = f.service.create_booking(req).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormat { ref field, .. } if field == "priority"));
    }

    #[tokio::test]
    async fn inactive_room_is_not_found() {
        let f = fixture(15, BookingPolicy::default()).await;
        let mut inactive = f.room.clone();
        inactive.is_active = false;
        f.store.seed_room(inactive).await;

        let err = f
            .service
            .create_booking(request(&f.room, "09:00", "10:00"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::RoomNotFound(f.room.id.clone()));
    }

    #[tokio::test]
    async fn capacity_is_rejected_by_default() {
        let f = fixture(4, BookingPolicy::default()).await;
        let mut req = request(&f.room, "09:00", "10:00");
        req.attendees = Some(6);

        let err = f.service.create_booking(req).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::CapacityExceeded {
                attendees: 6,
                capacity: 4
            }
        );
    }

    #[tokio::test]
    async fn capacity_only_warns_under_warn_policy() {
        let policy = BookingPolicy {
            capacity: CapacityPolicy::Warn,
            ..Default::default()
        };
        let f = fixture(4, policy).await;
        let mut req = request(&f.room, "09:00", "10:00");
        req.attendees = Some(6);

        let confirmation = f.service.create_booking(req).await.unwrap();
        assert_eq!(confirmation.warnings.len(), 1);
        assert!(confirmation.warnings[0].contains("capacity of 4"));
    }

    #[tokio::test]
    async fn adjacent_bookings_do_not_conflict() {
        let f = fixture(15, BookingPolicy::default()).await;
        f.service
            .create_booking(request(&f.room, "09:00", "10:00"))
            .await
            .unwrap();
        f.service
            .create_booking(request(&f.room, "10:00", "11:00"))
            .await
            .unwrap();
        f.service
            .create_booking(request(&f.room, "08:00", "09:00"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn overlapping_booking_names_the_existing_one() {
        let f = fixture(15, BookingPolicy::default()).await;
        f.service
            .create_booking(request(&f.room, "09:00", "10:30"))
            .await
            .unwrap();

        let mut second = request(&f.room, "10:00", "11:00");
        second.title = Some("Retro".to_string());
        let err = f.service.create_booking(second).await.unwrap_err();
        match err {
            DomainError::SlotConflict { title, start, end, .. } => {
                assert_eq!(title, "Sync");
                assert_eq!(start, "09:00");
                assert_eq!(end, "10:30");
            }
            other => panic!("expected SlotConflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn held_room_lock_surfaces_as_store_unavailable() {
        let f = fixture(15, BookingPolicy::default()).await;
        let lock = Arc::new(InMemoryRoomLock::new());
        let service = BookingService::new(
            f.store.clone(),
            f.store.clone(),
            lock.clone(),
            BookingPolicy {
                lock_attempts: 2,
                lock_retry_delay: Duration::from_millis(1),
                ..Default::default()
            },
        );
        assert!(lock
            .acquire(&format!("room:{}", f.room.id), "someone-else", 30)
            .await
            .unwrap());

        let err = service
            .create_booking(request(&f.room, "09:00", "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::StoreUnavailable(_)));
    }

    /// Delegates to the store, pausing before every window read.
    struct SlowBookings {
        inner: Arc<InMemoryStore>,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl BookingRepository for SlowBookings {
        async fn list_bookings_in_window(
            &self,
            room_id: Option<&str>,
            window_start: NaiveDateTime,
            window_end: NaiveDateTime,
        ) -> DomainResult<Vec<Booking>> {
            tokio::time::sleep(self.delay).await;
            self.inner
                .list_bookings_in_window(room_id, window_start, window_end)
                .await
        }

        async fn insert_booking(&self, booking: &NewBooking) -> DomainResult<Booking> {
            self.inner.insert_booking(booking).await
        }

        async fn get_booking(&self, id: &str) -> DomainResult<Option<Booking>> {
            self.inner.get_booking(id).await
        }

        async fn list_bookings_for_owner(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
            self.inner.list_bookings_for_owner(user_id).await
        }

        async fn delete_booking(&self, id: &str) -> DomainResult<()> {
            self.inner.delete_booking(id).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_request_does_not_keep_the_room_locked() {
        let f = fixture(15, BookingPolicy::default()).await;
        let service = BookingService::new(
            f.store.clone(),
            Arc::new(SlowBookings {
                inner: f.store.clone(),
                delay: Duration::from_millis(300),
            }),
            Arc::new(InMemoryRoomLock::new()),
            BookingPolicy::default(),
        );

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            service.create_booking(request(&f.room, "09:00", "10:00")),
        )
        .await;
        assert!(abandoned.is_err());

        service
            .create_booking(request(&f.room, "14:00", "15:00"))
            .await
            .expect("room lock should be free again");

        let booked = service.list_bookings_for_owner("user-1").await.unwrap();
        assert_eq!(booked.len(), 2);
        assert_eq!(clock_label(&booked[0].start_time), "09:00");
    }

    #[tokio::test]
    async fn only_owner_or_superadmin_may_cancel() {
        let f = fixture(15, BookingPolicy::default()).await;
        let confirmation = f
            .service
            .create_booking(request(&f.room, "09:00", "10:00"))
            .await
            .unwrap();

        let stranger = Profile::new(
            "user-2".into(),
            "b@example.com".into(),
            None,
            None,
            UserRole::Organizer,
        );
        let err = f
            .service
            .cancel_booking(&stranger, &confirmation.booking_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let admin = Profile::new(
            "admin".into(),
            "admin@example.com".into(),
            None,
            None,
            UserRole::Superadmin,
        );
        f.service
            .cancel_booking(&admin, &confirmation.booking_id)
            .await
            .unwrap();
        assert!(f.service.list_bookings_for_owner("user-1").await.unwrap().is_empty());
    }
}
