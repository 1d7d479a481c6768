use crate::domain::entities::{
    booked_by, AvailabilityTarget, Booking, Room, RoomAvailability, RoomFilter, RoomSummary,
    TimeSlot,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::booking_repository::BookingRepository;
use crate::domain::ports::room_repository::RoomRepository;
use crate::domain::services::{
    format_day_offset, format_duration_minutes, free_intervals, overlaps, Interval,
    MINUTES_PER_DAY,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Read-only view over rooms and their bookings.
#[derive(Clone)]
pub struct AvailabilityService {
    room_repo: Arc<dyn RoomRepository>,
    booking_repo: Arc<dyn BookingRepository>,
}

impl AvailabilityService {
    pub fn new(
        room_repo: Arc<dyn RoomRepository>,
        booking_repo: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            room_repo,
            booking_repo,
        }
    }

    /// Booked and free slots of the targeted room(s) over `[date 00:00, date 24:00)`.
    pub async fn get_availability(
        &self,
        target: &AvailabilityTarget,
        date: NaiveDate,
    ) -> DomainResult<Vec<RoomAvailability>> {
        let rooms = self.resolve_target(target).await?;
        let (day_start, day_end) = day_window(date);

        let room_filter = match target {
            AvailabilityTarget::AllActive => None,
            _ => rooms.first().map(|room| room.id.as_str()),
        };
        let bookings = self
            .booking_repo
            .list_bookings_in_window(room_filter, day_start, day_end)
            .await?;

        let mut by_room: HashMap<&str, Vec<&Booking>> = HashMap::new();
        for booking in &bookings {
            if overlaps(booking.start_time, booking.end_time, day_start, day_end) {
                by_room.entry(booking.room_id.as_str()).or_default().push(booking);
            }
        }

        let availability = rooms
            .iter()
            .map(|room| {
                let room_bookings = by_room.remove(room.id.as_str()).unwrap_or_default();
                room_day(room, date, day_start, day_end, room_bookings)
            })
            .collect();

        Ok(availability)
    }

    /// Active rooms with at least `min_capacity` seats and no booking overlapping `[start, end)`.
    pub async fn find_available_rooms(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        min_capacity: Option<i64>,
    ) -> DomainResult<Vec<Room>> {
        if end <= start {
            return Err(DomainError::InvalidRange {
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            });
        }

        let filter = RoomFilter::active().with_min_capacity(min_capacity);
        let rooms = self.room_repo.list_rooms(&filter).await?;

        let busy: HashSet<String> = self
            .booking_repo
            .list_bookings_in_window(None, start, end)
            .await?
            .into_iter()
            .filter(|b| overlaps(b.start_time, b.end_time, start, end))
            .map(|b| b.room_id)
            .collect();

        tracing::debug!(
            "Room search {} - {}: {} candidate rooms, {} busy",
            start,
            end,
            rooms.len(),
            busy.len()
        );

        Ok(rooms
            .into_iter()
            .filter(|room| !busy.contains(&room.id))
            .collect())
    }

    async fn resolve_target(&self, target: &AvailabilityTarget) -> DomainResult<Vec<Room>> {
        match target {
            AvailabilityTarget::Room(id) => {
                let room = self
                    .room_repo
                    .get_room(id)
                    .await?
                    .ok_or_else(|| DomainError::RoomNotFound(id.clone()))?;
                Ok(vec![room])
            }
            AvailabilityTarget::RoomNamed(name) => {
                let room = self
                    .room_repo
                    .get_room_by_name(name)
                    .await?
                    .ok_or_else(|| DomainError::RoomNotFound(name.clone()))?;
                Ok(vec![room])
            }
            AvailabilityTarget::AllActive => self.room_repo.list_rooms(&RoomFilter::active()).await,
        }
    }
}

fn day_window(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

fn room_day(
    room: &Room,
    date: NaiveDate,
    day_start: NaiveDateTime,
    day_end: NaiveDateTime,
    mut bookings: Vec<&Booking>,
) -> RoomAvailability {
    bookings.sort_by_key(|b| b.start_time);

    // Minutes since midnight, clipped to the day.
    let offset = |instant: NaiveDateTime| {
        (instant.clamp(day_start, day_end) - day_start).num_minutes()
    };

    let busy: Vec<Interval<i64>> = bookings
        .iter()
        .map(|b| Interval::new(offset(b.start_time), offset(b.end_time)))
        .collect();

    let booked = bookings
        .iter()
        .zip(&busy)
        .map(|(booking, span)| TimeSlot {
            start: format_day_offset(span.start),
            end: format_day_offset(span.end),
            duration: format_duration_minutes(span.end - span.start),
            is_booked: true,
            booking_id: Some(booking.id.clone()),
            event_name: Some(booking.title.clone()),
            booked_by: Some(booked_by(booking)),
            priority: Some(booking.priority),
        })
        .collect();

    let free = free_intervals(0, MINUTES_PER_DAY as i64, &busy)
        .into_iter()
        .map(|span| TimeSlot {
            start: format_day_offset(span.start),
            end: format_day_offset(span.end),
            duration: format_duration_minutes(span.end - span.start),
            is_booked: false,
            booking_id: None,
            event_name: None,
            booked_by: None,
            priority: None,
        })
        .collect();

    RoomAvailability {
        room: RoomSummary::from(room),
        date,
        booked,
        free,
    }
}
