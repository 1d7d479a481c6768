use crate::domain::entities::{
    display_name, format_instant, parse_instant, Booking, MeetingType, NewBooking, Priority,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::booking_repository::BookingRepository;
use crate::domain::services::overlaps;
use crate::infrastructure::persistence::{corrupt, Database};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{any::AnyRow, Row};

/// Raised by the `bookings_no_overlap` trigger.
const OVERLAP_SIGNAL: &str = "booking_overlap";

const BOOKING_SELECT: &str = "SELECT b.id, b.room_id, b.user_id, b.title, b.start_time, b.end_time,
        b.priority, b.attendees, b.zoom_required, b.meeting_type, b.created_at,
        p.first_name, p.last_name, p.email
     FROM bookings b
     LEFT JOIN profiles p ON p.id = b.user_id";

fn row_to_booking(row: &AnyRow) -> DomainResult<Booking> {
    let start_time: String = row.try_get("start_time")?;
    let end_time: String = row.try_get("end_time")?;
    let priority: String = row.try_get("priority")?;
    let meeting_type: String = row.try_get("meeting_type")?;
    let zoom_required: i32 = row.try_get("zoom_required")?;

    let first_name = row.try_get::<Option<String>, _>("first_name").ok().flatten();
    let last_name = row.try_get::<Option<String>, _>("last_name").ok().flatten();
    let email = row.try_get::<Option<String>, _>("email").ok().flatten();

    Ok(Booking {
        id: row.try_get("id")?,
        room_id: row.try_get("room_id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        start_time: parse_instant(&start_time).map_err(|e| corrupt("start_time", e))?,
        end_time: parse_instant(&end_time).map_err(|e| corrupt("end_time", e))?,
        priority: priority
            .parse::<Priority>()
            .map_err(|e| corrupt("priority", e))?,
        attendees: row.try_get::<Option<i64>, _>("attendees").ok().flatten(),
        zoom_required: zoom_required != 0,
        meeting_type: meeting_type
            .parse::<MeetingType>()
            .map_err(|e| corrupt("meeting_type", e))?,
        owner_name: display_name(first_name.as_deref(), last_name.as_deref(), email.as_deref()),
        created_at: row.try_get("created_at")?,
    })
}

fn is_overlap_rejection(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.message().contains(OVERLAP_SIGNAL))
}

impl Database {
    /// The existing booking a rejected insert collided with, if it can still be read.
    async fn find_overlapping(&self, booking: &NewBooking) -> DomainResult<Option<Booking>> {
        let candidates = self
            .list_bookings_in_window(Some(&booking.room_id), booking.start_time, booking.end_time)
            .await?;
        Ok(candidates
            .into_iter()
            .find(|b| overlaps(b.start_time, b.end_time, booking.start_time, booking.end_time)))
    }
}

#[async_trait]
impl BookingRepository for Database {
    async fn list_bookings_in_window(
        &self,
        room_id: Option<&str>,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> DomainResult<Vec<Booking>> {
        let mut builder: sqlx::QueryBuilder<sqlx::Any> =
            sqlx::QueryBuilder::new(format!("{} WHERE b.start_time <= ", BOOKING_SELECT));
        builder.push_bind(format_instant(&window_end));
        builder.push(" AND b.end_time >= ");
        builder.push_bind(format_instant(&window_start));
        if let Some(room_id) = room_id {
            builder.push(" AND b.room_id = ");
            builder.push_bind(room_id.to_string());
        }
        builder.push(" ORDER BY b.start_time");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_booking).collect()
    }

    async fn insert_booking(&self, booking: &NewBooking) -> DomainResult<Booking> {
        let result = sqlx::query(
            "INSERT INTO bookings (id, room_id, user_id, title, start_time, end_time, priority,
                attendees, zoom_required, meeting_type, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&booking.id)
        .bind(&booking.room_id)
        .bind(&booking.user_id)
        .bind(&booking.title)
        .bind(format_instant(&booking.start_time))
        .bind(format_instant(&booking.end_time))
        .bind(booking.priority.to_string())
        .bind(booking.attendees)
        .bind(if booking.zoom_required { 1i32 } else { 0i32 })
        .bind(booking.meeting_type.to_string())
        .bind(&booking.created_at)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            if !is_overlap_rejection(&e) {
                return Err(e.into());
            }
            tracing::warn!(
                "Store rejected overlapping booking for room {}",
                booking.room_id
            );
            return Err(match self.find_overlapping(booking).await? {
                Some(existing) => existing.conflict_error(),
                None => DomainError::SlotConflict {
                    title: "another booking".to_string(),
                    owner: None,
                    start: booking.start_time.format("%H:%M").to_string(),
                    end: booking.end_time.format("%H:%M").to_string(),
                },
            });
        }

        self.get_booking(&booking.id)
            .await?
            .ok_or_else(|| DomainError::StoreUnavailable(format!(
                "Booking {} vanished after insert",
                booking.id
            )))
    }

    async fn get_booking(&self, id: &str) -> DomainResult<Option<Booking>> {
        let row = sqlx::query(&format!("{} WHERE b.id = ?", BOOKING_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_booking).transpose()
    }

    async fn list_bookings_for_owner(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "{} WHERE b.user_id = ? ORDER BY b.start_time",
            BOOKING_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn delete_booking(&self, id: &str) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("Booking {} not found", id)));
        }
        Ok(())
    }
}
